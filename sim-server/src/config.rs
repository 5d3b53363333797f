//! On-disk description of one lesson, loaded from a TOML scenario file and
//! turned into the [`tradesim::lesson::LessonPlan`] the session engine runs.

use serde::Deserialize;
use tradesim::lesson::{Command, LessonPlan, ScheduledCommand};
use tradesim::{Price, Symbol};

#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    pub scenario_id: String,
    pub name: String,
    pub starting_cash: i64,
    #[serde(default)]
    pub securities: Vec<SecurityConfig>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SecurityConfig {
    pub symbol: String,
    pub starting_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineEntry {
    pub offset_s: u64,
    pub command: Command,
}

impl ScenarioConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ScenarioConfig = toml::from_str(&raw)?;
        Ok(config)
    }

    pub fn into_lesson_plan(self) -> LessonPlan {
        let mut plan = LessonPlan::new(self.name)
            .with_scenario_id(self.scenario_id)
            .with_starting_cash(Price(self.starting_cash));

        for security in self.securities {
            let symbol = Symbol::new(&security.symbol);
            plan = plan.with_security(symbol);
            if let Some(price) = security.starting_price {
                plan = plan.with_starting_price(symbol, Price(price));
            }
        }

        let mut timeline: Vec<ScheduledCommand> = self
            .timeline
            .into_iter()
            .map(|entry| ScheduledCommand {
                offset_s: entry.offset_s,
                command: entry.command,
            })
            .collect();
        timeline.sort_by_key(|entry| entry.offset_s);
        plan.timeline = timeline;

        plan
    }
}
