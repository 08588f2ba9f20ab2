use campus_trials::window_conf;

#[macroquad::main(window_conf)]
async fn main() {
    // Android logs through logcat
    #[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        if let Some(location) = panic_info.location() {
            eprintln!("  at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    campus_trials::run().await;
}
