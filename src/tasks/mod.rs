//! Embassy tasks for the firmware.
//!
//! - [`motion_task`]: the control loop. Receives command datagrams, ticks the
//!   gait and flushes the servos.
//! - [`net_task`]: WiFi association and the network stack runner.
//! - [`shutdown_task`]: turns a press on the boot button into a shutdown
//!   request observed by the control loop between ticks.
//!
//! Tasks are spawned from `main.rs`.
pub mod motion_task;
pub mod net_task;
pub mod shutdown_task;
