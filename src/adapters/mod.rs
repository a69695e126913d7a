//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter      | Implements              | Connects to               |
//! |--------------|-------------------------|---------------------------|
//! | `log_sink`   | EventSink               | `log` facade              |
//! | `memory`     | OutputPin               | in-process line journal   |
//! | `sysfs_gpio` | OutputPin               | `/sys/class/gpio` outputs |
//! |              | InputPin, EdgeInput     | `/sys/class/gpio` button  |

pub mod log_sink;
pub mod memory;
pub mod sysfs_gpio;
