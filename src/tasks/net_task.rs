//! WiFi connection and network stack runner.
extern crate alloc;

use alloc::string::String;
use anyhow::anyhow;
use embassy_net::Stack;
use embassy_time::Timer;
use esp_wifi::wifi::{ClientConfiguration, WifiController, WifiDevice};
use log::info;

#[embassy_executor::task]
pub async fn runner_task(mut runner: embassy_net::Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

pub async fn configurate_and_start_wifi(
    wifi_controller: &mut WifiController<'_>,
) -> anyhow::Result<()> {
    let ssid = env!("WIFI_SSID");
    let password = env!("WIFI_PASS");
    let config = esp_wifi::wifi::Configuration::Client(ClientConfiguration {
        ssid: String::from(ssid),
        password: String::from(password),
        ..Default::default()
    });

    info!("Connecting to wifi: {ssid}");
    wifi_controller
        .set_configuration(&config)
        .map_err(|e| anyhow!("wifi configuration rejected: {e:?}"))?;
    wifi_controller
        .set_power_saving(esp_wifi::config::PowerSaveMode::None)
        .map_err(|e| anyhow!("wifi power mode rejected: {e:?}"))?;
    wifi_controller
        .start()
        .map_err(|e| anyhow!("wifi start failed: {e:?}"))?;
    wifi_controller
        .connect_async()
        .await
        .map_err(|e| anyhow!("wifi connect failed: {e:?}"))?;

    if let Ok(rssi) = wifi_controller.rssi() {
        info!("Wifi connected! signal: {}", rssi)
    }
    Ok(())
}

/// Waits for the link and a DHCP lease.
pub async fn wait_for_network(stack: Stack<'static>) {
    while !stack.is_link_up() {
        Timer::after_millis(500).await;
    }
    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("[NET] address {}", config.address);
    }
}
