fn main() {
    slint_build::compile("ui/portfolio.slint").expect("Slint UI compilation failed");
}
