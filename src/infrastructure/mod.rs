pub mod chrome_driver;
pub mod form_driver;
pub mod js_executor;

pub use chrome_driver::ChromeFormDriver;
pub use form_driver::FormDriver;
pub use js_executor::JsExecutor;
