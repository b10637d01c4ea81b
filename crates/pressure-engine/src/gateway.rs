//! Action Gateways
//!
//! Validates discrete diplomatic, trade and military requests and turns
//! them into pressure events plus a real relation change. Also hosts the
//! domestic policy entry point.
//!
//! Every predicate is checked before the first mutation, so a rejected
//! request leaves the store and the realm untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use pressure_events::{AgentId, EventId, KingdomId, RelationScope, Tick, TypeId};

use crate::catalog::{type_ids, EventTemplate, TemplateCatalog, ENVOY_GROUP};
use crate::realm::{InstantAdjustment, Realm};
use crate::resolver::PolicyLever;
use crate::schedulers::{apply_instant_adjustment, PressureCtx};
use crate::store::EventStore;

/// Which desk handles an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Diplomacy,
    Trade,
    Military,
}

/// An eligibility predicate evaluated against live realm state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    AtWar,
    NotAtWar,
    Allied,
    NotAllied,
    /// Actor's stored relation toward the target is at least this
    MinRelation(f64),
    /// Actor's stored relation toward the target is at most this
    MaxRelation(f64),
}

impl Requirement {
    pub fn is_met(&self, realm: &dyn Realm, actor: KingdomId, target: KingdomId) -> bool {
        match *self {
            Requirement::AtWar => realm.is_at_war(actor, target),
            Requirement::NotAtWar => !realm.is_at_war(actor, target),
            Requirement::Allied => realm.is_allied(actor, target),
            Requirement::NotAllied => !realm.is_allied(actor, target),
            Requirement::MinRelation(min) => realm.relation(actor, target) >= min,
            Requirement::MaxRelation(max) => realm.relation(actor, target) <= max,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::AtWar => write!(f, "must be at war"),
            Requirement::NotAtWar => write!(f, "must not be at war"),
            Requirement::Allied => write!(f, "must be allied"),
            Requirement::NotAllied => write!(f, "must not be allied"),
            Requirement::MinRelation(min) => write!(f, "relation must be at least {}", min),
            Requirement::MaxRelation(max) => write!(f, "relation must be at most {}", max),
        }
    }
}

const GIFT_REQUIREMENTS: &[Requirement] = &[Requirement::NotAtWar, Requirement::MinRelation(-50.0)];
const TRADE_REQUIREMENTS: &[Requirement] = &[Requirement::NotAtWar, Requirement::MinRelation(10.0)];
const EMBARGO_REQUIREMENTS: &[Requirement] = &[Requirement::NotAllied];
const THREAT_REQUIREMENTS: &[Requirement] = &[Requirement::NotAllied, Requirement::MaxRelation(20.0)];
const AID_REQUIREMENTS: &[Requirement] = &[Requirement::Allied, Requirement::MinRelation(25.0)];
const TRIBUTE_REQUIREMENTS: &[Requirement] = &[Requirement::AtWar];

/// Static definition of an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub channel: Channel,
    pub requirements: &'static [Requirement],
    /// Registered on the actor, caused by the target
    pub visible: &'static str,
    /// Registered on the target, caused by the actor
    pub mirror: Option<&'static str>,
    /// Applied to the target's ledger alongside the mirror
    pub mirror_fuzz: InstantAdjustment,
    /// Change to how the target regards the actor
    pub relation_delta: f64,
    pub pool: &'static str,
}

/// Closed catalog of player and NPC actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SendGift,
    Insult,
    ProposeTrade,
    ImposeEmbargo,
    Threaten,
    RequestAid,
    DemandTribute,
}

impl ActionKind {
    pub fn all() -> &'static [ActionKind] {
        &[
            ActionKind::SendGift,
            ActionKind::Insult,
            ActionKind::ProposeTrade,
            ActionKind::ImposeEmbargo,
            ActionKind::Threaten,
            ActionKind::RequestAid,
            ActionKind::DemandTribute,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::SendGift => "send_gift",
            ActionKind::Insult => "insult",
            ActionKind::ProposeTrade => "propose_trade",
            ActionKind::ImposeEmbargo => "impose_embargo",
            ActionKind::Threaten => "threaten",
            ActionKind::RequestAid => "request_aid",
            ActionKind::DemandTribute => "demand_tribute",
        }
    }

    pub fn spec(self) -> ActionSpec {
        let none = InstantAdjustment::default();
        let (channel, requirements, visible, mirror, mirror_fuzz, relation_delta, pool): (
            Channel,
            &'static [Requirement],
            &'static str,
            Option<&'static str>,
            InstantAdjustment,
            f64,
            &'static str,
        ) = match self {
            ActionKind::SendGift => (
                Channel::Diplomacy,
                GIFT_REQUIREMENTS,
                type_ids::GIFT_SENT,
                Some(type_ids::GIFT_RECEIVED),
                InstantAdjustment::gold(25.0),
                5.0,
                "gift",
            ),
            ActionKind::Insult => (
                Channel::Diplomacy,
                &[],
                type_ids::INSULT_SENT,
                Some(type_ids::INSULT_RECEIVED),
                InstantAdjustment::happiness(-0.1),
                -6.0,
                "insult",
            ),
            ActionKind::ProposeTrade => (
                Channel::Trade,
                TRADE_REQUIREMENTS,
                type_ids::TRADE_PACT,
                Some(type_ids::TRADE_PACT),
                InstantAdjustment::gold(10.0),
                3.0,
                "trade",
            ),
            ActionKind::ImposeEmbargo => (
                Channel::Trade,
                EMBARGO_REQUIREMENTS,
                type_ids::EMBARGO_IMPOSED,
                Some(type_ids::EMBARGO),
                InstantAdjustment::gold(-15.0),
                -4.0,
                "embargo",
            ),
            ActionKind::Threaten => (
                Channel::Military,
                THREAT_REQUIREMENTS,
                type_ids::THREAT_MADE,
                Some(type_ids::THREAT_ISSUED),
                InstantAdjustment::default().with_security(-0.2),
                -5.0,
                "threat",
            ),
            ActionKind::RequestAid => (
                Channel::Military,
                AID_REQUIREMENTS,
                type_ids::ALLY_SUPPORT,
                Some(type_ids::AID_GIVEN),
                none,
                -2.0,
                "aid",
            ),
            ActionKind::DemandTribute => (
                Channel::Military,
                TRIBUTE_REQUIREMENTS,
                type_ids::TRIBUTE_COLLECTED,
                Some(type_ids::TRIBUTE_DEMAND),
                InstantAdjustment::gold(-30.0),
                -3.0,
                "tribute",
            ),
        };
        ActionSpec {
            kind: self,
            channel,
            requirements,
            visible,
            mirror,
            mirror_fuzz,
            relation_delta,
            pool,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown action: {}", s))
    }
}

/// A request to perform an action against another kingdom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    pub actor: KingdomId,
    pub target: KingdomId,
    /// Agent carrying the order; it stays busy for the visible event's duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envoy: Option<AgentId>,
}

impl ActionRequest {
    pub fn new(action: ActionKind, actor: KingdomId, target: KingdomId) -> Self {
        Self {
            action,
            actor,
            target,
            envoy: None,
        }
    }

    pub fn with_envoy(mut self, envoy: AgentId) -> Self {
        self.envoy = Some(envoy);
        self
    }
}

/// Why a request was refused. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionRejected {
    #[error("unknown kingdom: {0}")]
    UnknownKingdom(KingdomId),
    #[error("{0} cannot target itself")]
    SelfTarget(KingdomId),
    #[error("{action} rejected: {requirement}")]
    RequirementFailed {
        action: ActionKind,
        requirement: Requirement,
    },
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("{type_id} already active on {kingdom}")]
    AlreadyActive { type_id: TypeId, kingdom: KingdomId },
    #[error("envoy {0} is busy")]
    EnvoyBusy(AgentId),
    #[error("{0} is not a domestic policy")]
    NotAPolicy(TypeId),
}

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAction {
    pub action: ActionKind,
    pub actor: KingdomId,
    pub target: KingdomId,
    pub visible_event: EventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_event: Option<EventId>,
    pub relation_delta: f64,
    /// Line spoken by the envoy, from the action's pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bark: Option<String>,
}

/// Stateless entry point for actions and policies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionGateway;

impl ActionGateway {
    pub fn new() -> Self {
        Self
    }

    /// Validates and applies an action.
    pub fn apply(
        &self,
        ctx: &mut PressureCtx<'_>,
        realm: &mut dyn Realm,
        request: &ActionRequest,
        now: Tick,
    ) -> Result<AppliedAction, ActionRejected> {
        let spec = request.action.spec();
        let (actor, target) = (request.actor, request.target);
        let catalog = ctx.catalog;
        let barks = ctx.barks;

        let (visible, mirror) = match validate(catalog, ctx.store, &*realm, &spec, request, now) {
            Ok(templates) => templates,
            Err(rejection) => {
                tracing::debug!("Rejected {} from {} to {}: {}", spec.kind, actor, target, rejection);
                return Err(rejection);
            }
        };

        let visible_event = register(ctx, visible, target, actor, now);

        if let Some(envoy) = request.envoy {
            ctx.store
                .try_lock_entity(envoy, visible_event, visible.type_id.clone(), now, visible.duration);
        }

        let mut mirror_event = None;
        if let Some(template) = mirror {
            mirror_event = Some(register(ctx, template, actor, target, now));
            apply_instant_adjustment(realm, target, spec.mirror_fuzz);
        }

        realm.add_relation(target, actor, spec.relation_delta);

        if realm.is_player(actor) && realm.is_ai(target) {
            ctx.store.mark_known_ai(target);
        }

        let pool = mirror
            .and_then(|t| t.bark_pool(ENVOY_GROUP))
            .unwrap_or(spec.pool);
        let bark = barks.pick(pool, &mut *ctx.rng).map(str::to_string);

        tracing::info!(
            "{} applied {} to {} ({} / {:?})",
            actor,
            spec.kind,
            target,
            visible_event,
            mirror_event
        );

        Ok(AppliedAction {
            action: spec.kind,
            actor,
            target,
            visible_event,
            mirror_event,
            relation_delta: spec.relation_delta,
            bark,
        })
    }

    /// Enacts a domestic policy on `kingdom`.
    ///
    /// A policy sharing an exclusivity group with active events on the same
    /// kingdom supersedes them.
    pub fn enact_policy(
        &self,
        ctx: &mut PressureCtx<'_>,
        realm: &dyn Realm,
        kingdom: KingdomId,
        type_id: &str,
        now: Tick,
    ) -> Result<EventId, ActionRejected> {
        if !realm.contains(kingdom) {
            return Err(ActionRejected::UnknownKingdom(kingdom));
        }
        let catalog = ctx.catalog;
        let template = resolve(catalog, type_id)?;
        if PolicyLever::from_type_id(type_id).is_none() && template.exclusive_group.is_none() {
            return Err(ActionRejected::NotAPolicy(template.type_id.clone()));
        }
        if ctx.store.has_active_event(kingdom, type_id, now) {
            return Err(ActionRejected::AlreadyActive {
                type_id: template.type_id.clone(),
                kingdom,
            });
        }

        let superseded = match template.exclusive_group.as_deref() {
            Some(group) => ctx.store.take_where(kingdom, |e| {
                e.is_active(now)
                    && catalog
                        .by_type_id(e.type_id.as_str())
                        .is_some_and(|t| t.exclusive_group.as_deref() == Some(group))
            }),
            None => 0,
        };

        let id = ctx.store.add_event(
            Some(kingdom),
            kingdom,
            template.type_id.clone(),
            template.effects.clone(),
            RelationScope::Global,
            now,
            template.duration,
        );
        tracing::info!(
            "{} enacted {} ({}, superseded {})",
            kingdom,
            template.type_id,
            id,
            superseded
        );
        Ok(id)
    }
}

/// Checks every predicate of a request and resolves its templates.
fn validate<'c>(
    catalog: &'c TemplateCatalog,
    store: &EventStore,
    realm: &dyn Realm,
    spec: &ActionSpec,
    request: &ActionRequest,
    now: Tick,
) -> Result<(&'c EventTemplate, Option<&'c EventTemplate>), ActionRejected> {
    let (actor, target) = (request.actor, request.target);

    for kingdom in [actor, target] {
        if !realm.contains(kingdom) {
            return Err(ActionRejected::UnknownKingdom(kingdom));
        }
    }
    if actor == target {
        return Err(ActionRejected::SelfTarget(actor));
    }
    if let Some(requirement) = spec
        .requirements
        .iter()
        .find(|r| !r.is_met(realm, actor, target))
    {
        return Err(ActionRejected::RequirementFailed {
            action: spec.kind,
            requirement: *requirement,
        });
    }

    let visible = resolve(catalog, spec.visible)?;
    let mirror = spec.mirror.map(|id| resolve(catalog, id)).transpose()?;

    if store.has_active_by_causer(actor, spec.visible, target, now) {
        return Err(ActionRejected::AlreadyActive {
            type_id: visible.type_id.clone(),
            kingdom: actor,
        });
    }
    if let Some(mirror) = mirror {
        if store.has_active_by_causer(target, mirror.type_id.as_str(), actor, now) {
            return Err(ActionRejected::AlreadyActive {
                type_id: mirror.type_id.clone(),
                kingdom: target,
            });
        }
    }
    if let Some(envoy) = request.envoy {
        if store.is_entity_locked(envoy, now) {
            return Err(ActionRejected::EnvoyBusy(envoy));
        }
    }
    Ok((visible, mirror))
}

fn resolve<'a>(
    catalog: &'a TemplateCatalog,
    type_id: &str,
) -> Result<&'a EventTemplate, ActionRejected> {
    catalog
        .by_type_id(type_id)
        .ok_or_else(|| ActionRejected::UnknownTemplate(type_id.to_string()))
}

fn register(
    ctx: &mut PressureCtx<'_>,
    template: &EventTemplate,
    causer: KingdomId,
    causee: KingdomId,
    now: Tick,
) -> EventId {
    ctx.store.add_event(
        Some(causer),
        causee,
        template.type_id.clone(),
        template.effects.clone(),
        template.scope,
        now,
        template.duration,
    )
}
