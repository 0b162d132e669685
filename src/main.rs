#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

extern crate alloc;

use alloc::boxed::Box;
use anyhow::anyhow;
use core::future::pending;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::{AnyPin, Input, InputConfig, Pin, Pull};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::peripherals::I2C0;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};
use pebble_robot::config::{GaitConfig, PCA9685_ADDRESS};
use pebble_robot::robot::control::Robot;
use pebble_robot::servo::ServoDriver;
use pebble_robot::tasks::motion_task::{motion_task, PebbleRobot};
use pebble_robot::tasks::net_task::{configurate_and_start_wifi, runner_task};
use pebble_robot::tasks::shutdown_task::shutdown_task;

esp_bootloader_esp_idf::esp_app_desc!();

// PCA9685: SDA 21, SCL 22
// boot button: 0

macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.init_with(|| $val)
    }};
}

fn init_robot(
    i2c0: I2C0<'static>,
    sda: AnyPin<'static>,
    scl: AnyPin<'static>,
) -> anyhow::Result<PebbleRobot> {
    let i2c = I2c::new(i2c0, I2cConfig::default().with_frequency(Rate::from_khz(100)))
        .map_err(|e| anyhow!("i2c bus unavailable: {e:?}"))?
        .with_sda(sda)
        .with_scl(scl);
    let driver = ServoDriver::init(i2c, PCA9685_ADDRESS, None)
        .map_err(|e| anyhow!("PCA9685 init failed: {e}"))?;

    Ok(Robot::new(driver, Delay::new(), &GaitConfig::default()))
}

async fn halt(e: anyhow::Error) -> ! {
    error!("Fatal: {e:?}");
    loop {
        pending::<()>().await;
    }
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let p = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 32 * 1024);
    esp_alloc::heap_allocator!(#[unsafe(link_section = ".dram2_uninit")] size: 96 * 1024);

    let timer0 = TimerGroup::new(p.TIMG1);
    esp_hal_embassy::init(timer0.timer0);

    // the servos come up before the radio so a dead bus stops us early
    let robot = match init_robot(p.I2C0, p.GPIO21.degrade(), p.GPIO22.degrade()) {
        Ok(robot) => robot,
        Err(e) => halt(e).await,
    };

    let mut rng = esp_hal::rng::Rng::new(p.RNG);
    let timer1 = TimerGroup::new(p.TIMG0);
    let wifi_init = match esp_wifi::init(timer1.timer0, rng, p.RADIO_CLK) {
        Ok(wifi_init) => wifi_init,
        Err(e) => halt(anyhow!("wifi init failed: {e:?}")).await,
    };
    let wifi_init = Box::leak(Box::new(wifi_init));
    let (mut wifi_controller, interfaces) = match esp_wifi::wifi::new(wifi_init, p.WIFI) {
        Ok(wifi) => wifi,
        Err(e) => halt(anyhow!("wifi controller unavailable: {e:?}")).await,
    };

    if let Err(e) = configurate_and_start_wifi(&mut wifi_controller).await {
        halt(e).await;
    }

    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let config = NetConfig::dhcpv4(Default::default());
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        config,
        mk_static!(StackResources<3>, StackResources::new()),
        seed,
    );

    let button = Input::new(p.GPIO0, InputConfig::default().with_pull(Pull::Up));

    info!("Starting pebble robot...");
    for spawned in [
        spawner.spawn(runner_task(runner)),
        spawner.spawn(motion_task(stack, robot)),
        spawner.spawn(shutdown_task(button)),
    ] {
        if let Err(e) = spawned {
            error!("Fail spawning task: {e:?}");
        }
    }

    loop {
        pending::<()>().await;
    }
}
