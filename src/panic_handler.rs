use log::error;
use std::panic;

/// Pretty backtraces on stderr, plus a copy of the panic message in the log file.
pub fn initialize_panic_handler() {
    better_panic::install();

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            error!("Panic: {}", msg);
        } else if let Some(msg) = panic_info.payload().downcast_ref::<String>() {
            error!("Panic: {}", msg);
        } else {
            error!("Panic with unknown payload");
        }
        if let Some(location) = panic_info.location() {
            error!("  at {}:{}", location.file(), location.line());
        }
        default_hook(panic_info);
    }));
}
