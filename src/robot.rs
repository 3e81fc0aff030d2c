//! The restaurant robot
//!
//! Holds who the robot is, whether it has greeted the user yet, the ranking it
//! recommends from, and the console it talks through.

use std::io::{BufRead, Write};

use crate::console::Console;
use crate::error::Result;
use crate::ranking::{RankingModel, title_case};
use crate::settings::Settings;

/// Answer to a yes/no recommendation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// `y`/`yes`/`n`/`no`, any case. Anything else is `None`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(Answer::Yes),
            "n" | "no" => Some(Answer::No),
            _ => None,
        }
    }
}

pub struct RestaurantRobot<R, W> {
    name: String,
    user_name: Option<String>,
    ranking: RankingModel,
    console: Console<R, W>,
}

impl<R: BufRead, W: Write> RestaurantRobot<R, W> {
    pub fn new(name: impl Into<String>, ranking: RankingModel, console: Console<R, W>) -> Self {
        Self {
            name: name.into(),
            user_name: None,
            ranking,
            console,
        }
    }

    /// Build a robot from settings, opening the configured ranking file
    pub fn from_settings(settings: &Settings, input: R, output: W) -> Result<Self> {
        let ranking = RankingModel::from_settings(settings)?;
        let console = Console::new(&settings.template_path, settings.speak_color, input, output);
        Ok(Self::new(&settings.robot_name, ranking, console))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// User's name, once greeted
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn ranking(&self) -> &RankingModel {
        &self.ranking
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Introduce the robot and ask for the user's name until one is given
    pub fn hello(&mut self) -> Result<()> {
        loop {
            let answer = self.console.prompt("hello.txt", &[("robot_name", self.name.as_str())])?;
            let user_name = title_case(&answer);
            if !user_name.is_empty() {
                log::info!("Greeted {}", user_name);
                self.user_name = Some(user_name);
                return Ok(());
            }
        }
    }

    /// Greet first if the user's name is still unknown
    pub fn ensure_greeted(&mut self) -> Result<&str> {
        if self.user_name.is_none() {
            self.hello()?;
        }
        Ok(self.user_name.as_deref().unwrap_or_default())
    }

    /// Offer restaurants from the top of the ranking until the user accepts
    /// one or the ranking runs out. Returns the accepted restaurant.
    pub fn recommend_restaurant(&mut self) -> Result<Option<String>> {
        let user_name = self.ensure_greeted()?.to_string();

        let Some(mut restaurant) = self.ranking.get_most_popular::<&str>(&[]) else {
            log::debug!("Ranking is empty, nothing to recommend");
            return Ok(None);
        };
        let mut recommended = vec![restaurant.clone()];

        loop {
            let answer = self.console.prompt(
                "greeting.txt",
                &[
                    ("robot_name", self.name.as_str()),
                    ("user_name", user_name.as_str()),
                    ("restaurant", restaurant.as_str()),
                ],
            )?;

            match Answer::parse(&answer) {
                Some(Answer::Yes) => {
                    log::info!("{} accepted {}", user_name, restaurant);
                    return Ok(Some(restaurant));
                }
                Some(Answer::No) => match self.ranking.get_most_popular(recommended.as_slice()) {
                    Some(next) => {
                        recommended.push(next.clone());
                        restaurant = next;
                    }
                    None => {
                        log::debug!("All {} restaurants declined", recommended.len());
                        return Ok(None);
                    }
                },
                None => continue,
            }
        }
    }

    /// Ask for the user's favorite restaurant and count a vote for it
    pub fn ask_user_favorite(&mut self) -> Result<String> {
        let user_name = self.ensure_greeted()?.to_string();
        loop {
            let answer = self.console.prompt(
                "which_restaurant.txt",
                &[("robot_name", self.name.as_str()), ("user_name", user_name.as_str())],
            )?;
            if !answer.trim().is_empty() {
                self.ranking.increment(&answer)?;
                return Ok(title_case(&answer));
            }
        }
    }

    pub fn thank_you(&mut self) -> Result<()> {
        let user_name = self.ensure_greeted()?.to_string();
        self.console.say(
            "good_by.txt",
            &[("robot_name", self.name.as_str()), ("user_name", user_name.as_str())],
        )
    }
}
