use rayon::prelude::*;
use tracing::debug;

use crate::locator::locate;
use crate::matcher::{MatcherConfig, RouteMatch, disambiguate};
use crate::model::{Event, EventInput, Measure, Point};
use crate::network::RouteNetwork;
use crate::RouteId;

/// Resolves one input record into one event record.
///
/// Never fails: any condition along the way (missing coordinates, no
/// matching route, an unlocatable segment) is folded into the event's
/// comment and the remaining fields are left unresolved. Terminally
/// unmatched events (comment "no matching routes found") are the
/// hand-off signal to the external network-routing subsystem.
pub fn assemble(network: &RouteNetwork, config: &MatcherConfig, input: &EventInput) -> Event {
    let mut event = Event::from_input(input);

    // a record with only a begin point is a point event
    let (Some(begin), Some(end)) = (input.begin, input.end_or_begin()) else {
        annotate_missing(&mut event, input);
        return event;
    };

    match disambiguate(network, config, begin, end) {
        RouteMatch::Unique(route) => {
            resolve_measures(network, config, &mut event, route, begin, end);
        }
        RouteMatch::Fallback(candidates) => {
            debug!("Event {} fell back to {candidates:?}", event.id);
            // candidates are sorted lexically: picking the first is deterministic
            match candidates.into_iter().next() {
                Some(route) => {
                    event.push_comment("ambiguous match, first candidate route selected");
                    resolve_measures(network, config, &mut event, route, begin, end);
                }
                None => event.push_comment("no matching routes found"),
            }
        }
        RouteMatch::NoMatch => event.push_comment("no matching routes found"),
    }

    // equal input coordinates are reported independently of the
    // equal-measure correction applied above
    if begin == end {
        event.push_comment("begin and end points are identical");
    }

    event
}

/// Resolves the whole batch against the shared read-only network.
/// Records are independent, so they are processed in parallel; the
/// output keeps the input order and always has one event per input.
pub fn assemble_batch(
    network: &RouteNetwork,
    config: &MatcherConfig,
    inputs: &[EventInput],
) -> Vec<Event> {
    inputs
        .par_iter()
        .map(|input| assemble(network, config, input))
        .collect()
}

fn resolve_measures(
    network: &RouteNetwork,
    config: &MatcherConfig,
    event: &mut Event,
    route: RouteId,
    begin: Point,
    end: Point,
) {
    event.route = Some(route.clone());

    match locate(network, &route, begin, config) {
        Ok(measure) => event.begin_measure = Some(measure),
        Err(error) => event.push_comment(&format!("begin measure unavailable: {error}")),
    }

    match locate(network, &route, end, config) {
        Ok(measure) => event.end_measure = Some(measure),
        Err(error) => event.push_comment(&format!("end measure unavailable: {error}")),
    }

    // downstream LRS consumers reject zero-length events: nudge equal
    // measures apart symmetrically
    if let (Some(begin_measure), Some(end_measure)) = (event.begin_measure, event.end_measure)
        && begin_measure == end_measure
    {
        let epsilon = config.degenerate_epsilon;
        event.begin_measure = Some(Measure::from_value(begin_measure.value() - epsilon));
        event.end_measure = Some(Measure::from_value(end_measure.value() + epsilon));
    }
}

fn annotate_missing(event: &mut Event, input: &EventInput) {
    if input.begin.is_none() {
        event.push_comment("missing begin coordinates");
    }
    if input.end.is_none() {
        event.push_comment("missing end coordinates");
    }
}
