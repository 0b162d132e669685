use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use esp_hal::gpio::Input;
use log::info;

/// Raised once; the control loop checks it between ticks.
pub static SHUTDOWN: Signal<CriticalSectionRawMutex, ()> = Signal::new();

#[embassy_executor::task]
pub async fn shutdown_task(mut button: Input<'static>) {
    button.wait_for_falling_edge().await;
    info!("[SHUTDOWN_TASK] button pressed");
    SHUTDOWN.signal(());
}
