//! Standard projects and resource conversions
//!
//! Their effects are expressed as ordinary behavior outputs, so tile
//! placement, parameter raises and terraform rating go through the same
//! applier as card effects.

use crate::actions::{rejection, require_turn, Action, PATENT_REWARD};
use crate::core::{
    CardBehavior, PendingCardSelection, PlayerId, ResourceCondition, ResourceType,
    StandardProject,
};
use crate::events::StandardProjectPlayed;
use crate::game::{
    can_afford_standard_project, consume_action, process_tile_queue, BehaviorApplier, GameStatus,
    Mutation, SourceType,
};
use crate::{EngineError, Result};
use rustc_hash::FxHashMap;

/// Heat spent to raise temperature one step
pub const HEAT_PER_TEMPERATURE: i32 = 8;
/// Plants spent to place a greenery
pub const PLANTS_PER_GREENERY: i32 = 8;

fn project_outputs(project: StandardProject) -> Vec<ResourceCondition> {
    let own = ResourceCondition::own;
    match project {
        StandardProject::SellPatents => Vec::new(),
        StandardProject::PowerPlant => vec![own(ResourceType::EnergyProduction, 1)],
        StandardProject::Asteroid => vec![own(ResourceType::Temperature, 1)],
        StandardProject::Aquifer => vec![own(ResourceType::OceanPlacement, 1)],
        StandardProject::Greenery => vec![own(ResourceType::GreeneryPlacement, 1)],
        StandardProject::City => vec![
            own(ResourceType::CreditsProduction, 1),
            own(ResourceType::CityPlacement, 1),
        ],
    }
}

fn run_project(m: &mut Mutation<'_>, player_id: &PlayerId, project: StandardProject) -> Result<()> {
    m.state.require_status(GameStatus::Active)?;
    require_turn(m, player_id)?;
    let availability = can_afford_standard_project(project, m.state, m.player(player_id)?);
    if !availability.available {
        return Err(rejection(project.as_str(), &availability.errors));
    }

    let source = format!("standard-project-{project}");
    let applier = BehaviorApplier::new(player_id.clone(), source.as_str());
    let outputs = project_outputs(project);
    let behavior = CardBehavior {
        outputs,
        ..Default::default()
    };
    applier.check_behavior(m, &behavior, None)?;

    // Validation done; write
    m.add_resources(player_id, [(ResourceType::Credits, -availability.cost)])?;
    applier.apply_outputs(m, &behavior.outputs)?;

    let game_id = m.game_id().clone();
    m.events.push(StandardProjectPlayed {
        game_id,
        player_id: player_id.clone(),
        project,
    });
    process_tile_queue(m, player_id)?;
    m.record(
        player_id,
        source,
        SourceType::StandardProject,
        format!("{project} for {} credits", availability.cost),
    );
    consume_action(m, player_id)
}

macro_rules! standard_project {
    ($(#[$meta:meta])* $name:ident, $project:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Action for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn apply(&self, m: &mut Mutation<'_>, player: &PlayerId) -> Result<()> {
                run_project(m, player, $project)
            }
        }
    };
}

standard_project!(
    /// 14 credits: raise temperature one step
    LaunchAsteroid,
    StandardProject::Asteroid,
    "launch-asteroid"
);
standard_project!(
    /// 11 credits: +1 energy production
    BuildPowerPlant,
    StandardProject::PowerPlant,
    "build-power-plant"
);
standard_project!(
    /// 18 credits: place an ocean
    BuildAquifer,
    StandardProject::Aquifer,
    "build-aquifer"
);
standard_project!(
    /// 23 credits: place a greenery
    PlantGreenery,
    StandardProject::Greenery,
    "plant-greenery"
);
standard_project!(
    /// 25 credits: +1 credit production and place a city
    BuildCity,
    StandardProject::City,
    "build-city"
);

/// Offer the hand for sale; the sale happens in
/// [`ConfirmSellPatents`](crate::actions::ConfirmSellPatents)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SellPatents;

impl Action for SellPatents {
    fn name(&self) -> &'static str {
        "sell-patents"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        require_turn(m, player_id)?;
        let player = m.player(player_id)?;
        let availability =
            can_afford_standard_project(StandardProject::SellPatents, m.state, player);
        if !availability.available {
            return Err(rejection("sell-patents", &availability.errors));
        }

        let hand = player.hand().to_vec();
        let rewards: FxHashMap<_, _> = hand.iter().map(|c| (c.clone(), PATENT_REWARD)).collect();
        let selection = PendingCardSelection {
            card_costs: hand.iter().map(|c| (c.clone(), 0)).collect(),
            card_rewards: rewards,
            source: StandardProject::SellPatents.to_string(),
            min_cards: 0,
            max_cards: hand.len(),
            available_cards: hand,
        };
        m.player_mut(player_id)?.selection_mut().card = Some(selection);
        m.logger.normal(&format!("{player_id} is selling patents"));
        Ok(())
    }
}

/// Spend 8 heat to raise temperature one step
///
/// Allowed at maximum temperature; the heat is spent without effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertHeatToTemperature;

impl Action for ConvertHeatToTemperature {
    fn name(&self) -> &'static str {
        "convert-heat-to-temperature"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        convert(
            m,
            player_id,
            ResourceCondition::own(ResourceType::Heat, HEAT_PER_TEMPERATURE),
            ResourceCondition::own(ResourceType::Temperature, 1),
        )
    }
}

/// Spend 8 plants to place a greenery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertPlantsToGreenery;

impl Action for ConvertPlantsToGreenery {
    fn name(&self) -> &'static str {
        "convert-plants-to-greenery"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        convert(
            m,
            player_id,
            ResourceCondition::own(ResourceType::Plants, PLANTS_PER_GREENERY),
            ResourceCondition::own(ResourceType::GreeneryPlacement, 1),
        )
    }
}

fn convert(
    m: &mut Mutation<'_>,
    player_id: &PlayerId,
    input: ResourceCondition,
    output: ResourceCondition,
) -> Result<()> {
    m.state.require_status(GameStatus::Active)?;
    require_turn(m, player_id)?;
    let held = m
        .player(player_id)?
        .resources()
        .get(input.resource)
        .unwrap_or(0);
    if held < input.amount {
        return Err(EngineError::insufficient(input.resource, input.amount, held));
    }

    let source = format!("convert-{}", input.resource);
    let applier = BehaviorApplier::new(player_id.clone(), source.as_str());
    applier.apply_inputs(m, std::slice::from_ref(&input))?;
    applier.apply_outputs(m, std::slice::from_ref(&output))?;
    process_tile_queue(m, player_id)?;
    m.record(
        player_id,
        source,
        SourceType::Conversion,
        format!("converted {} {} into {}", input.amount, input.resource, output.resource),
    );
    consume_action(m, player_id)
}
