//! Control loop task.
//!
//! One iteration per datagram or per receive timeout: decode, tick the robot
//! with the measured wall-clock delta, flush. A missed datagram counts as an
//! idle command so the legs wind down when the remote goes quiet.
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration, Instant};
use esp_hal::{delay::Delay, i2c::master::I2c, Blocking};
use log::{debug, error, info, warn};

use super::net_task::wait_for_network;
use super::shutdown_task::SHUTDOWN;
use crate::config::{COMMAND_PORT, COMMAND_TIMEOUT_SECS, RX_BUF_SIZE, RX_META_SIZE};
use crate::robot::commands::Command;
use crate::robot::control::Robot;

pub type PebbleRobot = Robot<I2c<'static, Blocking>, Delay>;

#[embassy_executor::task]
pub async fn motion_task(stack: Stack<'static>, mut robot: PebbleRobot) {
    let mut rx_meta = [PacketMetadata::EMPTY; RX_META_SIZE];
    let mut rx_buf = [0u8; RX_BUF_SIZE];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buf = [0u8; 1];
    let mut datagram = [0u8; RX_BUF_SIZE];

    wait_for_network(stack).await;

    let mut socket = UdpSocket::new(stack, &mut rx_meta, &mut rx_buf, &mut tx_meta, &mut tx_buf);
    if let Err(e) = socket.bind(COMMAND_PORT) {
        error!("[MOTION_TASK] unable to bind port {}: {:?}", COMMAND_PORT, e);
        robot.shutdown();
        return;
    }
    info!("[MOTION_TASK] listening on udp port {}", COMMAND_PORT);

    let timeout = Duration::from_secs(COMMAND_TIMEOUT_SECS);
    let mut last_tick = Instant::now();
    while !SHUTDOWN.signaled() {
        let command = match with_timeout(timeout, socket.recv_from(&mut datagram)).await {
            Ok(Ok((len, _))) => Command::try_from(&datagram[..len]).unwrap_or_else(|e| {
                warn!("[MOTION_TASK] {}", e);
                Command::IDLE
            }),
            Ok(Err(e)) => {
                warn!("[MOTION_TASK] receive failed: {:?}", e);
                Command::IDLE
            }
            Err(_) => Command::IDLE,
        };

        let now = Instant::now();
        let delta_time = (now - last_tick).as_micros() as f32 / 1_000_000.0;
        last_tick = now;

        debug!("[MOTION_TASK] {:?} after {}s", command, delta_time);
        robot.handle(&command, delta_time);
    }

    robot.shutdown();
    info!("[MOTION_TASK] stopped");
}
