//! Dialogue sequencing: greet, recommend, collect a favorite, say goodbye

use std::io::{self, BufRead, Write};

use crate::error::Result;
use crate::robot::RestaurantRobot;
use crate::settings::Settings;

/// Run the four dialogue steps in order
pub fn run<R: BufRead, W: Write>(robot: &mut RestaurantRobot<R, W>) -> Result<()> {
    robot.hello()?;
    let accepted = robot.recommend_restaurant()?;
    log::debug!("Recommendation outcome: {:?}", accepted);
    let favorite = robot.ask_user_favorite()?;
    log::debug!("Favorite recorded: {}", favorite);
    robot.thank_you()
}

/// One interactive session on stdin/stdout
pub fn talk_about_restaurant(settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut robot = RestaurantRobot::from_settings(settings, stdin.lock(), stdout.lock())?;
    log::info!(
        "{} is ready ({} restaurants ranked)",
        robot.name(),
        robot.ranking().len()
    );
    run(&mut robot)
}
