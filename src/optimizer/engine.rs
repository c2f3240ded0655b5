//! Water-filling optimizer over the selected banks
//!
//! Every bank's resolved schedule is cut into marginal-rate slices, the slices
//! of all candidate banks are pooled, and the principal is poured into them
//! best first. A bank whose rates rise with balance is poured at its average
//! rate; when the pour stops partway up such a ladder, the bank's raw bands
//! and the band starts are tried as well and the best split is kept. This
//! runs once per bank subset, salary routing and card spend split; the
//! winners become the returned scenarios.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::plan::{AllocationPlan, BankAllocation, ScenarioKind};
use super::slices::{bank_slices, cut_points, iron, Slice};
use crate::error::{CalcError, Result};
use crate::interest::{calculate, evaluate, InterestBreakdown};
use crate::profile::ActivityProfile;
use crate::rates::BankProduct;

/// Above this many banks, subsets are ranked prefixes instead of all 2^n
pub const EXHAUSTIVE_SEARCH_LIMIT: usize = 12;

/// Optimizer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Most banks any plan may fund (None = no limit)
    pub max_banks: Option<usize>,

    /// Also return a whole-principal plan for every selected bank
    pub include_single_bank_baselines: bool,

    /// Salary can only be credited to one bank; try each salary bank in turn.
    /// When off, every bank sees the full profile.
    pub route_salary_credit: bool,

    /// Card spend is one monthly budget; split it across the funded banks.
    /// When off, every bank sees the full card spend.
    pub route_card_spend: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_banks: None,
            include_single_bank_baselines: true,
            route_salary_credit: true,
            route_card_spend: true,
        }
    }
}

/// Where the salary credit and card spend go for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
struct Routing {
    salary_bank: Option<usize>,
    /// Card spend each bank sees, indexed like the selection
    card_spend: Vec<Decimal>,
}

/// One evaluated split: amounts and breakdowns indexed like the selection
struct Candidate {
    allocations: Vec<Decimal>,
    breakdowns: Vec<InterestBreakdown>,
    routing: Routing,
    total: Decimal,
}

impl Candidate {
    fn funded(&self) -> usize {
        self.allocations.iter().filter(|a| !a.is_zero()).count()
    }

    fn beats(&self, other: &Candidate) -> bool {
        self.total > other.total || (self.total == other.total && self.funded() < other.funded())
    }
}

/// A bank's slices as resolved for one routing
struct Schedule {
    bank: usize,
    raw: Vec<Slice>,
    ironed: Vec<Slice>,
}

/// How one bank takes part in a pour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Pour {
    /// Fill the raw bands in balance order instead of the averaged slices
    raw: bool,
    /// Most this bank may receive
    limit: Option<Decimal>,
}

/// Distributes a principal across a fixed selection of banks
pub struct DistributionOptimizer<'a> {
    products: Vec<&'a BankProduct>,
    config: OptimizerConfig,
}

impl<'a> DistributionOptimizer<'a> {
    /// Create an optimizer over a non-empty selection of distinct banks
    pub fn new(products: Vec<&'a BankProduct>, config: OptimizerConfig) -> Result<Self> {
        if products.is_empty() {
            return Err(CalcError::NoBanksAvailable);
        }
        Ok(Self { products, config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Ranked plans for `principal`, best first
    ///
    /// The first plan is always `Optimal`. Every plan lists every selected
    /// bank and its amounts sum exactly to `principal`.
    pub fn optimize(&self, principal: Decimal, profile: &ActivityProfile) -> Result<Vec<AllocationPlan>> {
        if principal < Decimal::ZERO {
            return Err(CalcError::invalid_principal(principal));
        }
        profile.validate()?;

        let n = self.products.len();
        let limit = self.config.max_banks.unwrap_or(n).clamp(1, n);
        let salary_routings = self.salary_routings(profile);
        let subsets = self.subsets(principal, profile, limit)?;

        let mut candidates = Vec::new();
        for subset in &subsets {
            let splits = self.spend_splits(profile, subset);
            for &salary_bank in &salary_routings {
                if !salary_bank.map_or(true, |bank| subset.contains(&bank)) {
                    continue;
                }
                for card_spend in &splits {
                    let routing = Routing {
                        salary_bank,
                        card_spend: card_spend.clone(),
                    };
                    candidates.push(self.fill(principal, profile, subset, routing)?);
                }
            }
        }
        log::debug!(
            "Evaluated {} candidate splits ({} subsets, {} salary routings)",
            candidates.len(),
            subsets.len(),
            salary_routings.len()
        );

        let mut plans = Vec::new();
        if let Some(best) = best_of(&candidates, limit) {
            plans.push(self.plan(ScenarioKind::Optimal, principal, best));
        }
        for k in 1..limit {
            if let Some(best) = best_of(&candidates, k) {
                plans.push(self.plan(ScenarioKind::AtMostBanks(k), principal, best));
            }
        }
        if self.config.include_single_bank_baselines {
            for bank in 0..n {
                let salary_bank = self.salary_routing_for(profile, bank);
                let mut singles = Vec::new();
                for card_spend in self.spend_splits(profile, &[bank]) {
                    let routing = Routing { salary_bank, card_spend };
                    singles.push(self.fill(principal, profile, &[bank], routing)?);
                }
                if let Some(single) = best_of(&singles, 1) {
                    let kind = ScenarioKind::SingleBank(self.products[bank].name.clone());
                    plans.push(self.plan(kind, principal, single));
                }
            }
        }

        let plans = rank(plans);
        if let Some(best) = plans.first() {
            log::info!(
                "Optimized {} across {} banks: {} plans, best earns {} ({} funded)",
                principal,
                n,
                plans.len(),
                best.total_annual_interest,
                best.funded_count()
            );
        }
        Ok(plans)
    }

    /// Salary routings to try: nowhere, then each bank whose rules look at salary
    fn salary_routings(&self, profile: &ActivityProfile) -> Vec<Option<usize>> {
        let mut routings = vec![None];
        if self.config.route_salary_credit && profile.has_salary_credit {
            routings.extend(
                self.products
                    .iter()
                    .enumerate()
                    .filter(|(_, product)| product.uses_salary())
                    .map(|(bank, _)| Some(bank)),
            );
        }
        routings
    }

    fn salary_routing_for(&self, profile: &ActivityProfile, bank: usize) -> Option<usize> {
        let routed = self.config.route_salary_credit
            && profile.has_salary_credit
            && self.products[bank].uses_salary();
        routed.then_some(bank)
    }

    /// Ways to split the card spend across `subset`
    ///
    /// Each bank gets nothing or exactly one of its spend thresholds, and the
    /// shares never exceed the total. Spend between two thresholds unlocks no
    /// more than the lower one, so these splits reach every outcome. Unsplit
    /// spend is left unrouted. Banks outside the subset get nothing.
    fn spend_splits(&self, profile: &ActivityProfile, subset: &[usize]) -> Vec<Vec<Decimal>> {
        let n = self.products.len();
        let total = profile.monthly_card_spend;
        if !self.config.route_card_spend {
            return vec![vec![total; n]];
        }

        let mut splits = vec![vec![Decimal::ZERO; n]];
        for &bank in subset {
            let levels: Vec<Decimal> = self.products[bank]
                .spend_thresholds()
                .into_iter()
                .filter(|level| *level <= total)
                .collect();
            if levels.is_empty() {
                continue;
            }

            let mut extended = Vec::with_capacity(splits.len() * (levels.len() + 1));
            for split in splits {
                let used: Decimal = split.iter().sum();
                for &level in &levels {
                    if used + level <= total {
                        let mut shared = split.clone();
                        shared[bank] = level;
                        extended.push(shared);
                    }
                }
                extended.push(split);
            }
            splits = extended;
        }
        // Cheapest splits first, so ties keep the smaller spend commitment
        splits.sort_by_key(|split| split.iter().sum::<Decimal>());
        splits
    }

    /// The profile a bank sees under a routing
    fn profile_for(&self, profile: &ActivityProfile, bank: usize, routing: &Routing) -> ActivityProfile {
        let seen = if !self.config.route_salary_credit || routing.salary_bank == Some(bank) {
            profile.clone()
        } else {
            profile.without_salary_credit()
        };
        seen.with_card_spend(routing.card_spend[bank])
    }

    /// Bank subsets to search, each sorted by selection index
    fn subsets(&self, principal: Decimal, profile: &ActivityProfile, limit: usize) -> Result<Vec<Vec<usize>>> {
        let n = self.products.len();
        if n <= EXHAUSTIVE_SEARCH_LIMIT {
            return Ok((1usize..(1 << n))
                .filter(|mask| mask.count_ones() as usize <= limit)
                .map(|mask| (0..n).filter(|bank| mask & (1 << bank) != 0).collect())
                .collect());
        }

        log::warn!("{n} banks selected; searching ranked prefixes instead of every subset");

        // Rank banks by what the whole principal would earn there alone
        let mut ranked = Vec::with_capacity(n);
        for bank in 0..n {
            let routing = Routing {
                salary_bank: self.salary_routing_for(profile, bank),
                card_spend: vec![profile.monthly_card_spend; n],
            };
            let single = calculate(self.products[bank], principal, &self.profile_for(profile, bank, &routing))?;
            ranked.push((bank, single.total_annual_interest));
        }
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let order: Vec<usize> = ranked.into_iter().map(|(bank, _)| bank).collect();

        let mut subsets: Vec<Vec<usize>> = (0..n).map(|bank| vec![bank]).collect();
        for k in 2..=limit {
            let mut prefix = order[..k].to_vec();
            prefix.sort_unstable();
            subsets.push(prefix);
        }
        Ok(subsets)
    }

    /// Best split of the principal over `subset` under one routing
    fn fill(
        &self,
        principal: Decimal,
        profile: &ActivityProfile,
        subset: &[usize],
        routing: Routing,
    ) -> Result<Candidate> {
        let schedules: Vec<Schedule> = subset
            .iter()
            .map(|&bank| {
                let product = self.products[bank];
                let bands = evaluate(product, &self.profile_for(profile, bank, &routing));
                let raw = bank_slices(bank, &bands, product.base_rate);
                Schedule {
                    bank,
                    ironed: iron(raw.clone()),
                    raw,
                }
            })
            .collect();

        let mut pours = vec![Pour::default(); self.products.len()];
        let allocations = self
            .pour(principal, &schedules, &pours)
            .ok_or(CalcError::NoBanksAvailable)?;
        let mut best = self.candidate(allocations, profile, &routing)?;

        // Each accepted change fixes how one bank is poured; one round per bank
        for _ in 0..schedules.len() {
            let mut improved = false;
            for schedule in &schedules {
                let amount = best.allocations[schedule.bank];
                for alternative in self.alternatives(schedule, pours[schedule.bank], amount) {
                    let mut trial = pours.clone();
                    trial[schedule.bank] = alternative;
                    let Some(allocations) = self.pour(principal, &schedules, &trial) else {
                        continue;
                    };
                    let candidate = self.candidate(allocations, profile, &routing)?;
                    if candidate.beats(&best) {
                        log::debug!(
                            "{}: {:?} improves {} to {}",
                            self.products[schedule.bank].name,
                            alternative,
                            best.total,
                            candidate.total
                        );
                        best = candidate;
                        pours = trial;
                        improved = true;
                    }
                }
            }
            if !improved {
                break;
            }
        }

        Ok(best)
    }

    /// Other ways to pour a bank that stopped at `amount`
    fn alternatives(&self, schedule: &Schedule, current: Pour, amount: Decimal) -> Vec<Pour> {
        let mut alternatives = Vec::new();
        if amount.is_zero() {
            return alternatives;
        }

        if !current.raw {
            let cuts = cut_points(&schedule.raw, &schedule.ironed, amount);
            if !cuts.is_empty() {
                alternatives.push(Pour { raw: true, ..current });
            }
            alternatives.extend(cuts.into_iter().map(|cut| Pour {
                raw: false,
                limit: Some(cut),
            }));
        }

        // Too little to pass a balance gate: the bank may be better left empty
        let gated = self.products[schedule.bank]
            .minimum_balance()
            .map_or(false, |minimum| amount < minimum);
        if gated && current.limit != Some(Decimal::ZERO) {
            alternatives.push(Pour {
                limit: Some(Decimal::ZERO),
                ..current
            });
        }

        alternatives
    }

    /// Marginal-rate order: rate desc, fewer tiers remaining, bank name, position
    fn slice_order(&self, a: &Slice, b: &Slice) -> Ordering {
        b.rate
            .cmp(&a.rate)
            .then(a.tiers_remaining.cmp(&b.tiers_remaining))
            .then_with(|| self.products[a.bank].name.cmp(&self.products[b.bank].name))
            .then(a.start.cmp(&b.start))
    }

    /// Pour the principal into the best available slice until it is placed
    ///
    /// Each bank's slices are taken in balance order. None when the limits
    /// leave nowhere for the rest of the principal.
    fn pour(&self, principal: Decimal, schedules: &[Schedule], pours: &[Pour]) -> Option<Vec<Decimal>> {
        let queues: Vec<&[Slice]> = schedules
            .iter()
            .map(|s| if pours[s.bank].raw { s.raw.as_slice() } else { s.ironed.as_slice() })
            .collect();
        let mut next = vec![0usize; queues.len()];
        let mut allocations = vec![Decimal::ZERO; self.products.len()];
        let mut remaining = principal;

        let room = |bank: usize, allocations: &[Decimal]| {
            pours[bank].limit.map_or(true, |limit| allocations[bank] < limit)
        };

        while remaining > Decimal::ZERO {
            let pick = (0..queues.len())
                .filter(|&q| next[q] < queues[q].len() && room(schedules[q].bank, &allocations))
                .min_by(|&p, &q| self.slice_order(&queues[p][next[p]], &queues[q][next[q]]))?;

            let slice = &queues[pick][next[pick]];
            let mut take = slice.capacity.map_or(remaining, |capacity| capacity.min(remaining));
            if let Some(limit) = pours[slice.bank].limit {
                take = take.min(limit - allocations[slice.bank]);
            }
            allocations[slice.bank] += take;
            remaining -= take;
            next[pick] += 1;
            log::debug!(
                "{} @ {}: +{} from {}",
                self.products[slice.bank].name,
                slice.rate,
                take,
                slice.start
            );
        }

        Some(allocations)
    }

    /// Recompute what a split actually earns
    fn candidate(&self, allocations: Vec<Decimal>, profile: &ActivityProfile, routing: &Routing) -> Result<Candidate> {
        let mut breakdowns = Vec::with_capacity(self.products.len());
        for (bank, product) in self.products.iter().enumerate() {
            let seen = self.profile_for(profile, bank, routing);
            breakdowns.push(calculate(product, allocations[bank], &seen)?);
        }
        let total = breakdowns.iter().map(|b| b.total_annual_interest).sum();

        Ok(Candidate {
            allocations,
            breakdowns,
            routing: routing.clone(),
            total,
        })
    }

    fn plan(&self, kind: ScenarioKind, principal: Decimal, candidate: &Candidate) -> AllocationPlan {
        let allocations = self
            .products
            .iter()
            .enumerate()
            .map(|(bank, product)| BankAllocation {
                bank: product.name.clone(),
                amount: candidate.allocations[bank],
                card_spend: candidate.routing.card_spend[bank],
                breakdown: candidate.breakdowns[bank].clone(),
            })
            .collect();
        let salary_bank = candidate
            .routing
            .salary_bank
            .map(|bank| self.products[bank].name.clone());

        AllocationPlan::new(kind, principal, salary_bank, allocations)
    }
}

/// Highest-earning candidate funding at most `max_funded` banks
fn best_of(candidates: &[Candidate], max_funded: usize) -> Option<&Candidate> {
    candidates
        .iter()
        .filter(|c| c.funded() <= max_funded)
        .fold(None, |best, c| match best {
            Some(b) if !c.beats(b) => Some(b),
            _ => Some(c),
        })
}

/// Sort by interest, then fewer funded banks, then kind; drop repeated splits
fn rank(mut plans: Vec<AllocationPlan>) -> Vec<AllocationPlan> {
    plans.sort_by(|a, b| {
        b.total_annual_interest
            .cmp(&a.total_annual_interest)
            .then(a.funded_count().cmp(&b.funded_count()))
            .then_with(|| a.kind.cmp(&b.kind))
    });

    let mut ranked: Vec<AllocationPlan> = Vec::with_capacity(plans.len());
    for plan in plans {
        if !ranked.iter().any(|kept| kept.same_split(&plan)) {
            ranked.push(plan);
        }
    }
    ranked
}
