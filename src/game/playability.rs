//! Read-only legality checks for cards, card actions and standard projects
//!
//! Checks accumulate every failure so a client can show all reasons at once.
//! Nothing here mutates state.

use crate::core::{
    BoundCheck, Card, CardAction, CardId, Player, PlayerId, RequirementType, ResourceCondition,
    ResourceType, StandardProject, Tag, TileType,
};
use crate::game::{GamePhase, GameState, MAX_OCEANS, MAX_TEMPERATURE};
use crate::loader::CardRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationErrorKind {
    Cost,
    Requirement,
    GlobalParam,
    Phase,
    Resource,
    Turn,
    GameState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<i32>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        ValidationError {
            kind,
            message: message.into(),
            required: None,
            current: None,
        }
    }

    pub fn with_values(mut self, required: i32, current: i32) -> Self {
        self.required = Some(required);
        self.current = Some(current);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.required, self.current) {
            (Some(required), Some(current)) => {
                write!(f, "{} (required {required}, current {current})", self.message)
            }
            _ => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityResult {
    pub playable: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for PlayabilityResult {
    fn default() -> Self {
        PlayabilityResult {
            playable: true,
            errors: Vec::new(),
        }
    }
}

impl PlayabilityResult {
    pub fn add_error(&mut self, error: ValidationError) {
        self.playable = false;
        self.errors.push(error);
    }

    pub fn has_error(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoicePlayability {
    pub choice_index: usize,
    pub affordable: bool,
    pub errors: Vec<ValidationError>,
}

/// Affordability of a manual card action, per choice when it has any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlayability {
    pub affordable: bool,
    pub errors: Vec<ValidationError>,
    pub playable_choices: Vec<usize>,
    pub choices: Vec<ChoicePlayability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAvailability {
    pub project: StandardProject,
    pub cost: i32,
    pub available: bool,
    pub errors: Vec<ValidationError>,
}

// ---------------------------------------------------------------------------
// Counting helpers shared with the behavior applier
// ---------------------------------------------------------------------------

/// Tags on played cards plus the corporation; `None` counts every player
pub fn count_tags(
    state: &GameState,
    registry: &dyn CardRegistry,
    player: Option<&PlayerId>,
    tag: Tag,
) -> i32 {
    state
        .players
        .iter()
        .filter(|p| player.map_or(true, |id| p.id == *id))
        .map(|p| player_tag_count(p, registry, tag))
        .sum()
}

fn player_tag_count(player: &Player, registry: &dyn CardRegistry, tag: Tag) -> i32 {
    player
        .played_cards()
        .iter()
        .chain(player.corporation.as_ref())
        .filter_map(|id| registry.get_by_id(id).ok())
        .map(|card| card.count_tag(tag))
        .sum()
}

/// `resource` held on the player's cards that store that kind
fn stored_on_cards(player: &Player, registry: &dyn CardRegistry, resource: ResourceType) -> i32 {
    player
        .storage_map()
        .iter()
        .filter(|(id, _)| {
            registry
                .get_by_id(id)
                .ok()
                .and_then(|card| card.resource_storage.as_ref().map(|s| s.resource))
                == Some(resource)
        })
        .map(|(_, amount)| *amount)
        .sum()
}

fn discount_outputs(player: &Player) -> impl Iterator<Item = &ResourceCondition> {
    player
        .effects()
        .iter()
        .flat_map(|effect| effect.behavior.outputs.iter())
        .filter(|output| output.resource == ResourceType::Discount)
}

/// Credits knocked off `card` by the player's discount effects
pub fn card_discount(player: &Player, card: &Card) -> i32 {
    discount_outputs(player)
        .filter(|d| {
            if d.affected_tags.is_empty() {
                d.affected_standard_projects.is_empty()
            } else {
                d.affected_tags.iter().any(|tag| card.has_tag(*tag))
            }
        })
        .map(|d| d.amount)
        .sum()
}

/// Cost of `card` for `player` after discounts, never below zero
pub fn effective_cost(card: &Card, player: &Player) -> i32 {
    (card.cost - card_discount(player, card)).max(0)
}

pub fn standard_project_cost(project: StandardProject, player: &Player) -> i32 {
    let discount: i32 = discount_outputs(player)
        .filter(|d| d.affected_standard_projects.contains(&project))
        .map(|d| d.amount)
        .sum();
    (project.cost() - discount).max(0)
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Whether `player` may play `card` right now
pub fn can_play_card(
    card: &Card,
    state: &GameState,
    player: &Player,
    registry: &dyn CardRegistry,
) -> PlayabilityResult {
    let mut result = PlayabilityResult::default();

    if state.phase() != GamePhase::Action {
        result.add_error(ValidationError::new(
            ValidationErrorKind::Phase,
            format!("not in action phase (phase is {})", state.phase()),
        ));
    }

    if state.current_turn().map(|t| &t.player) != Some(&player.id) {
        result.add_error(ValidationError::new(ValidationErrorKind::Turn, "not player's turn"));
    }

    if !player.has_in_hand(&card.id) {
        result.add_error(ValidationError::new(
            ValidationErrorKind::GameState,
            "card not in player's hand",
        ));
        return result;
    }

    check_requirements(card, state, player, registry, &mut result);
    check_cost(card, player, &mut result);
    result
}

fn check_requirements(
    card: &Card,
    state: &GameState,
    player: &Player,
    registry: &dyn CardRegistry,
    result: &mut PlayabilityResult,
) {
    let params = &state.global_parameters;

    for requirement in &card.requirements {
        let current = match requirement.kind {
            RequirementType::Temperature => params.temperature(),
            RequirementType::Oxygen => params.oxygen(),
            RequirementType::Oceans => params.oceans(),
            RequirementType::Tr => player.terraform_rating(),
            RequirementType::Tags => match requirement.tag {
                Some(tag) => player_tag_count(player, registry, tag),
                None => continue,
            },
            RequirementType::Production => match requirement.resource {
                Some(resource) => player.production().get(resource).unwrap_or(0),
                None => continue,
            },
            RequirementType::Resource => match requirement.resource {
                Some(resource) if resource.is_card_resource() => {
                    stored_on_cards(player, registry, resource)
                }
                Some(resource) => player.resources().get(resource).unwrap_or(0),
                None => continue,
            },
            RequirementType::Cities => state.board.count_tiles(TileType::City, Some(&player.id)),
            RequirementType::Greeneries => {
                state.board.count_tiles(TileType::Greenery, Some(&player.id))
            }
            // No venus track on this board
            RequirementType::Venus => continue,
        };

        match requirement.bound.check(current) {
            BoundCheck::Within => {}
            BoundCheck::BelowMin(min) => result.add_error(
                ValidationError::new(
                    ValidationErrorKind::Requirement,
                    format!("{} requirement not met", requirement.kind),
                )
                .with_values(min, current),
            ),
            BoundCheck::AboveMax(max) => result.add_error(
                ValidationError::new(
                    ValidationErrorKind::Requirement,
                    format!("{} exceeds maximum", requirement.kind),
                )
                .with_values(max, current),
            ),
        }
    }
}

/// Optimistic: any steel (building) or titanium (space) counts as enough;
/// the exact split is validated when the card is paid for.
fn check_cost(card: &Card, player: &Player, result: &mut PlayabilityResult) {
    let resources = player.resources();
    let cost = effective_cost(card, player);
    if resources.credits >= cost {
        return;
    }

    let steel_helps = card.has_tag(Tag::Building) && resources.steel > 0;
    let titanium_helps = card.has_tag(Tag::Space) && resources.titanium > 0;
    let substitute_helps = player.payment_substitutes().iter().any(|s| {
        resources.get(s.resource).unwrap_or(0) > 0 && s.conversion_rate > 0
    });
    if !steel_helps && !titanium_helps && !substitute_helps {
        result.add_error(
            ValidationError::new(ValidationErrorKind::Cost, "insufficient credits")
                .with_values(cost, resources.credits),
        );
    }
}

// ---------------------------------------------------------------------------
// Card actions
// ---------------------------------------------------------------------------

/// Affordability of a manual action's inputs, checked per choice
pub fn can_use_card_action(action: &CardAction, player: &Player) -> ActionPlayability {
    let mut result = ActionPlayability::default();

    if action.play_count > 0 {
        result.errors.push(ValidationError::new(
            ValidationErrorKind::GameState,
            format!("{} was already used this generation", action.card_name),
        ));
        return result;
    }

    let base_errors = input_errors(&action.behavior.inputs, player, &action.card_id);

    if action.behavior.choices.is_empty() {
        result.affordable = base_errors.is_empty();
        result.errors = base_errors;
        return result;
    }

    result.errors = base_errors;
    for (index, choice) in action.behavior.choices.iter().enumerate() {
        let inputs: Vec<ResourceCondition> = action
            .behavior
            .inputs
            .iter()
            .chain(choice.inputs.iter())
            .cloned()
            .collect();
        let errors = input_errors(&inputs, player, &action.card_id);
        let affordable = errors.is_empty();
        if affordable {
            result.playable_choices.push(index);
        }
        result.choices.push(ChoicePlayability {
            choice_index: index,
            affordable,
            errors,
        });
    }
    result.affordable = !result.playable_choices.is_empty();
    result
}

fn input_errors(inputs: &[ResourceCondition], player: &Player, card: &CardId) -> Vec<ValidationError> {
    let resources = player.resources();
    let production = player.production();
    let mut errors = Vec::new();

    for input in inputs {
        let resource = input.resource;
        let available = if resource.is_basic() {
            resources.get(resource).unwrap_or(0)
        } else if resource.is_production() {
            production.get(resource).unwrap_or(0) - crate::core::Production::floor(resource)
        } else if resource.is_card_resource() {
            player.storage(card)
        } else {
            continue;
        };
        if available < input.amount {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::Resource,
                    format!("insufficient {resource}"),
                )
                .with_values(input.amount, available),
            );
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Standard projects
// ---------------------------------------------------------------------------

pub fn can_afford_standard_project(
    project: StandardProject,
    state: &GameState,
    player: &Player,
) -> ProjectAvailability {
    let cost = standard_project_cost(project, player);
    let mut errors = Vec::new();
    let params = &state.global_parameters;

    match project {
        StandardProject::SellPatents => {
            if player.hand().is_empty() {
                errors.push(
                    ValidationError::new(ValidationErrorKind::Resource, "no cards in hand to sell")
                        .with_values(1, 0),
                );
            }
        }
        StandardProject::Asteroid if params.temperature_steps_remaining() == 0 => {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::GlobalParam,
                    "temperature already at maximum",
                )
                .with_values(MAX_TEMPERATURE, params.temperature()),
            );
        }
        StandardProject::Aquifer if params.oceans_remaining() == 0 => {
            errors.push(
                ValidationError::new(ValidationErrorKind::GlobalParam, "oceans already at maximum")
                    .with_values(MAX_OCEANS, params.oceans()),
            );
        }
        _ => {}
    }

    let credits = player.resources().credits;
    if credits < cost {
        errors.push(
            ValidationError::new(ValidationErrorKind::Cost, "insufficient credits")
                .with_values(cost, credits),
        );
    }

    ProjectAvailability {
        project,
        cost,
        available: errors.is_empty(),
        errors,
    }
}

/// Availability of every standard project for `player`
pub fn standard_projects(state: &GameState, player: &Player) -> Vec<ProjectAvailability> {
    StandardProject::ALL
        .iter()
        .map(|project| can_afford_standard_project(*project, state, player))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Bound, CardBehavior, CardEffect, CardType, GameId, Requirement, ResourceStorage, Trigger,
    };
    use crate::events::EventSink;
    use crate::game::{ActionCount, Deck, GameSettings, GlobalParameters};
    use crate::loader::InMemoryCardRegistry;

    fn setup() -> (GameState, EventSink) {
        let mut state = GameState::new(GameId::new("g1"), GameSettings::default(), Deck::empty());
        state.add_player(Player::new(PlayerId::new("p1"), "Alice"));
        state.add_player(Player::new(PlayerId::new("p2"), "Bob"));
        let mut events = EventSink::new(GameId::new("g1"));
        state.set_phase(GamePhase::Action, &mut events);
        state.start_turn(PlayerId::new("p1"), ActionCount::full(), &mut events);
        (state, events)
    }

    fn hold(state: &mut GameState, events: &mut EventSink, card: &Card, credits: i32) {
        let player = state.get_player_mut(&PlayerId::new("p1")).unwrap();
        player.add_to_hand(card.id.clone(), events);
        player.add_resources([(ResourceType::Credits, credits)], events);
    }

    fn oxygen_card() -> Card {
        let mut card = Card::new("P10", "Lichen", CardType::Automated, 7);
        card.requirements
            .push(Requirement::new(RequirementType::Oxygen, Bound::at_least(5)));
        card
    }

    #[test]
    fn test_requirement_lower_bound_is_inclusive() {
        let (mut state, mut events) = setup();
        let card = oxygen_card();
        hold(&mut state, &mut events, &card, 20);
        let registry = InMemoryCardRegistry::default();

        state.global_parameters = GlobalParameters::new(-30, 4, 0);
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        let result = can_play_card(&card, &state, player, &registry);
        assert!(!result.playable);
        assert_eq!(result.errors[0].kind, ValidationErrorKind::Requirement);
        assert_eq!(result.errors[0].required, Some(5));
        assert_eq!(result.errors[0].current, Some(4));

        state.global_parameters = GlobalParameters::new(-30, 5, 0);
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        assert!(can_play_card(&card, &state, player, &registry).playable);
    }

    #[test]
    fn test_not_in_hand_short_circuits() {
        let (state, _) = setup();
        let card = oxygen_card();
        let registry = InMemoryCardRegistry::default();
        let player = state.get_player(&PlayerId::new("p2")).unwrap();
        let result = can_play_card(&card, &state, player, &registry);

        // turn error plus hand error, nothing from requirements or cost
        assert_eq!(result.errors.len(), 2);
        assert!(result.has_error(ValidationErrorKind::Turn));
        assert!(result.has_error(ValidationErrorKind::GameState));
        assert!(!result.has_error(ValidationErrorKind::Requirement));
    }

    #[test]
    fn test_errors_accumulate() {
        let (mut state, mut events) = setup();
        let card = oxygen_card();
        hold(&mut state, &mut events, &card, 2);
        state.set_phase(GamePhase::ProductionAndCardDraw, &mut events);
        let registry = InMemoryCardRegistry::default();
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        let result = can_play_card(&card, &state, player, &registry);
        assert!(result.has_error(ValidationErrorKind::Phase));
        assert!(result.has_error(ValidationErrorKind::Requirement));
        assert!(result.has_error(ValidationErrorKind::Cost));
    }

    #[test]
    fn test_steel_makes_building_card_optimistically_playable() {
        let (mut state, mut events) = setup();
        let mut card = Card::new("P11", "Mine", CardType::Automated, 10);
        card.tags.push(Tag::Building);
        hold(&mut state, &mut events, &card, 3);
        let registry = InMemoryCardRegistry::default();

        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        assert!(can_play_card(&card, &state, player, &registry).has_error(ValidationErrorKind::Cost));

        state
            .get_player_mut(&PlayerId::new("p1"))
            .unwrap()
            .add_resources([(ResourceType::Steel, 1)], &mut events);
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        assert!(can_play_card(&card, &state, player, &registry).playable);
    }

    #[test]
    fn test_tag_requirement_counts_corporation() {
        let (mut state, mut events) = setup();
        let mut corp = Card::new("C1", "Corp", CardType::Corporation, 0);
        corp.tags.push(Tag::Science);
        let mut lab = Card::new("P12", "Lab", CardType::Automated, 0);
        lab.tags.push(Tag::Science);
        let mut card = Card::new("P13", "Research", CardType::Automated, 0);
        card.requirements.push(Requirement::tags(Tag::Science, Bound::at_least(2)));
        let registry = InMemoryCardRegistry::new(vec![corp, lab, card.clone()]).unwrap();
        hold(&mut state, &mut events, &card, 0);

        {
            let player = state.get_player_mut(&PlayerId::new("p1")).unwrap();
            player.add_played_card(CardId::new("P12"));
        }
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        assert!(!can_play_card(&card, &state, player, &registry).playable);

        state.get_player_mut(&PlayerId::new("p1")).unwrap().corporation = Some(CardId::new("C1"));
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        assert!(can_play_card(&card, &state, player, &registry).playable);
        assert_eq!(count_tags(&state, &registry, None, Tag::Science), 2);
    }

    #[test]
    fn test_resource_requirement_counts_matching_storage_only() {
        let (mut state, mut events) = setup();
        let mut zoo = Card::new("P20", "Zoo", CardType::Active, 0);
        zoo.resource_storage = Some(ResourceStorage {
            resource: ResourceType::Animals,
            capacity: None,
            starting: 0,
        });
        let mut vat = Card::new("P21", "Vat", CardType::Active, 0);
        vat.resource_storage = Some(ResourceStorage {
            resource: ResourceType::Microbes,
            capacity: None,
            starting: 0,
        });
        let mut card = Card::new("P22", "Decomposers", CardType::Automated, 0);
        let mut needs_microbes = Requirement::new(RequirementType::Resource, Bound::at_least(3));
        needs_microbes.resource = Some(ResourceType::Microbes);
        card.requirements.push(needs_microbes);
        let registry = InMemoryCardRegistry::new(vec![zoo, vat, card.clone()]).unwrap();
        hold(&mut state, &mut events, &card, 0);

        let p1 = PlayerId::new("p1");
        state.get_player_mut(&p1).unwrap().add_storage(
            &CardId::new("P20"),
            ResourceType::Animals,
            5,
            None,
            &mut events,
        );
        let player = state.get_player(&p1).unwrap();
        let result = can_play_card(&card, &state, player, &registry);
        assert!(!result.playable);
        assert_eq!(result.errors[0].current, Some(0));

        state.get_player_mut(&p1).unwrap().add_storage(
            &CardId::new("P21"),
            ResourceType::Microbes,
            3,
            None,
            &mut events,
        );
        let player = state.get_player(&p1).unwrap();
        assert!(can_play_card(&card, &state, player, &registry).playable);
    }

    #[test]
    fn test_discounts() {
        let (mut state, mut events) = setup();
        let mut discount = ResourceCondition::own(ResourceType::Discount, 3);
        discount.affected_tags = vec![Tag::Earth];
        let effect = CardEffect {
            card_id: CardId::new("P14"),
            card_name: "Earth Office".to_string(),
            behavior_index: 0,
            behavior: CardBehavior {
                triggers: vec![Trigger::auto()],
                outputs: vec![discount],
                ..Default::default()
            },
        };
        let player = state.get_player_mut(&PlayerId::new("p1")).unwrap();
        player.add_effect(effect, &mut events);

        let mut earth = Card::new("P15", "Earth Card", CardType::Automated, 2);
        earth.tags.push(Tag::Earth);
        let other = Card::new("P16", "Other", CardType::Automated, 10);
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        assert_eq!(effective_cost(&earth, player), 0);
        assert_eq!(effective_cost(&other, player), 10);
        assert_eq!(standard_project_cost(StandardProject::City, player), 25);
    }

    #[test]
    fn test_action_choices() {
        let (mut state, mut events) = setup();
        let action = CardAction {
            card_id: CardId::new("P17"),
            card_name: "Converter".to_string(),
            behavior_index: 0,
            behavior: CardBehavior {
                triggers: vec![Trigger::manual()],
                choices: vec![
                    crate::core::Choice {
                        inputs: vec![ResourceCondition::own(ResourceType::Energy, 1)],
                        outputs: vec![],
                    },
                    crate::core::Choice {
                        inputs: vec![ResourceCondition::own(ResourceType::Heat, 1)],
                        outputs: vec![],
                    },
                ],
                ..Default::default()
            },
            play_count: 0,
        };
        let player = state.get_player_mut(&PlayerId::new("p1")).unwrap();
        player.add_resources([(ResourceType::Heat, 1)], &mut events);

        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        let result = can_use_card_action(&action, player);
        assert!(result.affordable);
        assert_eq!(result.playable_choices, vec![1]);
        assert!(!result.choices[0].affordable);
        assert_eq!(result.choices[0].errors[0].kind, ValidationErrorKind::Resource);

        let used = CardAction {
            play_count: 1,
            ..action
        };
        assert!(!can_use_card_action(&used, player).affordable);
    }

    #[test]
    fn test_standard_project_availability() {
        let (mut state, mut events) = setup();
        state
            .get_player_mut(&PlayerId::new("p1"))
            .unwrap()
            .add_resources([(ResourceType::Credits, 14)], &mut events);
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        assert!(can_afford_standard_project(StandardProject::Asteroid, &state, player).available);
        assert!(!can_afford_standard_project(StandardProject::City, &state, player).available);
        assert!(!can_afford_standard_project(StandardProject::SellPatents, &state, player).available);

        state.global_parameters = GlobalParameters::new(8, 0, 0);
        let player = state.get_player(&PlayerId::new("p1")).unwrap();
        let asteroid = can_afford_standard_project(StandardProject::Asteroid, &state, player);
        assert_eq!(asteroid.errors[0].kind, ValidationErrorKind::GlobalParam);
        assert_eq!(standard_projects(&state, player).len(), StandardProject::ALL.len());
    }
}
