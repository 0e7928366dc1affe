pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fields;
pub mod logs;
pub mod page;
pub mod sampler;
pub mod surface;
pub mod telemetry;

pub use channel::{Channel, LocalChannel, SocketChannel};
pub use config::ConsoleConfig;
pub use error::ConsoleError;
pub use page::ModulePage;
