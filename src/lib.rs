//! Roboter - a console robot that recommends restaurants
//!
//! Core modules:
//! - `ranking`: Persistent restaurant popularity tally (CSV)
//! - `robot`: The restaurant robot and its dialogue steps
//! - `conversation`: Fixed-order session driver
//! - `console`: Template rendering and prompting
//! - `settings`: File locations, robot name and color

pub mod console;
pub mod conversation;
pub mod error;
pub mod ranking;
pub mod robot;
pub mod settings;

pub use error::{Error, Result};
pub use ranking::RankingModel;
pub use robot::RestaurantRobot;
pub use settings::{Settings, SpeakColor};

/// Defaults and file format constants
pub mod consts {
    /// Name the robot uses unless configured otherwise
    pub const DEFAULT_ROBOT_NAME: &str = "Roboko";

    /// Ranking file, relative to the working directory
    pub const DEFAULT_CSV_FILE_PATH: &str = "ranking.csv";
    /// Optional JSON settings file, relative to the working directory
    pub const SETTINGS_FILE: &str = "roboter.json";

    /// Ranking CSV header columns
    pub const RANKING_COLUMN_NAME: &str = "NAME";
    pub const RANKING_COLUMN_COUNT: &str = "COUNT";

    /// Width of the `=` rules framing every template
    pub const SPLITTER_WIDTH: usize = 60;
}
