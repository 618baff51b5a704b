pub mod common;
pub mod singbox;
pub mod ss;
pub mod ssr;
pub mod vmess;

pub use common::explode;
pub use singbox::check_native;
pub use ss::explode_ss;
pub use ssr::explode_ssr;
pub use vmess::explode_vmess;
