//! Temperature, oxygen and ocean tracking
//!
//! Parameters only move up. Each `increase_*` clamps to the remaining
//! headroom and reports how many whole steps were actually applied. Terraform
//! rating is never awarded here; callers decide whether a step earns TR.

use crate::core::PlayerId;
use crate::events::{EventSink, OceansChanged, OxygenChanged, TemperatureChanged};
use serde::{Deserialize, Serialize};

pub const MIN_TEMPERATURE: i32 = -30;
pub const MAX_TEMPERATURE: i32 = 8;
/// Degrees per temperature step
pub const TEMPERATURE_STEP: i32 = 2;
pub const MIN_OXYGEN: i32 = 0;
pub const MAX_OXYGEN: i32 = 14;
pub const MIN_OCEANS: i32 = 0;
pub const MAX_OCEANS: i32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalParameters {
    temperature: i32,
    oxygen: i32,
    oceans: i32,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        GlobalParameters {
            temperature: MIN_TEMPERATURE,
            oxygen: MIN_OXYGEN,
            oceans: MIN_OCEANS,
        }
    }
}

impl GlobalParameters {
    /// Starting values, clamped into range
    pub fn new(temperature: i32, oxygen: i32, oceans: i32) -> Self {
        GlobalParameters {
            temperature: temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
            oxygen: oxygen.clamp(MIN_OXYGEN, MAX_OXYGEN),
            oceans: oceans.clamp(MIN_OCEANS, MAX_OCEANS),
        }
    }

    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    pub fn oxygen(&self) -> i32 {
        self.oxygen
    }

    pub fn oceans(&self) -> i32 {
        self.oceans
    }

    pub fn temperature_steps_remaining(&self) -> i32 {
        (MAX_TEMPERATURE - self.temperature) / TEMPERATURE_STEP
    }

    pub fn oxygen_steps_remaining(&self) -> i32 {
        MAX_OXYGEN - self.oxygen
    }

    pub fn oceans_remaining(&self) -> i32 {
        MAX_OCEANS - self.oceans
    }

    /// Game end condition
    pub fn is_maxed(&self) -> bool {
        self.temperature >= MAX_TEMPERATURE
            && self.oxygen >= MAX_OXYGEN
            && self.oceans >= MAX_OCEANS
    }

    /// Raise temperature by up to `steps` steps of 2 degrees
    pub fn increase_temperature(
        &mut self,
        steps: i32,
        changed_by: Option<&PlayerId>,
        events: &mut EventSink,
    ) -> i32 {
        let actual = steps.clamp(0, self.temperature_steps_remaining());
        if actual > 0 {
            let target = self.temperature + actual * TEMPERATURE_STEP;
            self.set_temperature(target, changed_by, events);
        }
        actual
    }

    pub fn increase_oxygen(
        &mut self,
        steps: i32,
        changed_by: Option<&PlayerId>,
        events: &mut EventSink,
    ) -> i32 {
        let actual = steps.clamp(0, self.oxygen_steps_remaining());
        if actual > 0 {
            self.set_oxygen(self.oxygen + actual, changed_by, events);
        }
        actual
    }

    pub fn increase_oceans(
        &mut self,
        count: i32,
        changed_by: Option<&PlayerId>,
        events: &mut EventSink,
    ) -> i32 {
        let actual = count.clamp(0, self.oceans_remaining());
        if actual > 0 {
            self.set_oceans(self.oceans + actual, changed_by, events);
        }
        actual
    }

    /// Record one placed ocean; false once all oceans are out
    pub fn place_ocean(&mut self, changed_by: Option<&PlayerId>, events: &mut EventSink) -> bool {
        self.increase_oceans(1, changed_by, events) == 1
    }

    pub fn set_temperature(&mut self, value: i32, changed_by: Option<&PlayerId>, events: &mut EventSink) {
        let old = self.temperature;
        self.temperature = value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        if old != self.temperature {
            events.push(TemperatureChanged {
                game_id: events.game_id().clone(),
                old,
                new: self.temperature,
                changed_by: changed_by.cloned(),
            });
        }
    }

    pub fn set_oxygen(&mut self, value: i32, changed_by: Option<&PlayerId>, events: &mut EventSink) {
        let old = self.oxygen;
        self.oxygen = value.clamp(MIN_OXYGEN, MAX_OXYGEN);
        if old != self.oxygen {
            events.push(OxygenChanged {
                game_id: events.game_id().clone(),
                old,
                new: self.oxygen,
                changed_by: changed_by.cloned(),
            });
        }
    }

    pub fn set_oceans(&mut self, value: i32, changed_by: Option<&PlayerId>, events: &mut EventSink) {
        let old = self.oceans;
        self.oceans = value.clamp(MIN_OCEANS, MAX_OCEANS);
        if old != self.oceans {
            events.push(OceansChanged {
                game_id: events.game_id().clone(),
                old,
                new: self.oceans,
                changed_by: changed_by.cloned(),
            });
        }
    }
}
