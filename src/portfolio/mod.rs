pub mod animator;
pub mod classifier;
pub mod phase;
pub mod sheep;
pub mod site;
pub mod tnt;

pub use phase::{ Phase, PhaseController };
pub use site::{ PortfolioSite, WidgetView };
