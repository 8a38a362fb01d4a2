pub mod chart;
pub mod de;
pub mod settings;
pub mod stats;
pub mod trade;
pub mod view;

pub use chart::*;
pub use settings::*;
pub use stats::*;
pub use trade::*;
pub use view::*;
