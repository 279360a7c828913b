//! Named-session bucketing for explicit layouts.

use std::collections::BTreeMap;

use crate::config::NamedSessionPolicy;
use crate::models::{NamedSession, Session, SessionLayout, SessionName, TimeToken};

/// Buckets punches into the layout's sessions.
///
/// Returns one session per layout entry plus the punches that fit nowhere.
pub fn assign_layout(
    tokens: &[TimeToken],
    layout: &SessionLayout,
    policy: &NamedSessionPolicy,
) -> (BTreeMap<SessionName, Session>, Vec<TimeToken>) {
    let mut buckets: Vec<Vec<TimeToken>> = vec![Vec::new(); layout.sessions.len()];
    let mut dropped = Vec::new();

    for &punch in tokens {
        match bucket_index(punch, layout, policy) {
            Some(index) => buckets[index].push(punch),
            None => dropped.push(punch),
        }
    }

    let sessions = layout
        .sessions
        .iter()
        .zip(buckets)
        .map(|(template, mut bucket)| {
            bucket.sort();
            bucket.dedup();
            (template.name, build_session(template, bucket, policy))
        })
        .collect();

    (sessions, dropped)
}

/// First window containing the punch, else the nearest start within snapping distance.
fn bucket_index(
    punch: TimeToken,
    layout: &SessionLayout,
    policy: &NamedSessionPolicy,
) -> Option<usize> {
    if let Some(index) = layout
        .sessions
        .iter()
        .position(|session| session.window().contains(punch))
    {
        return Some(index);
    }

    layout
        .sessions
        .iter()
        .enumerate()
        .map(|(index, session)| (index, session.start.minutes_until(punch).abs()))
        .min_by_key(|&(_, distance)| distance)
        .filter(|&(_, distance)| distance <= policy.snap_distance)
        .map(|(index, _)| index)
}

fn build_session(
    template: &NamedSession,
    bucket: Vec<TimeToken>,
    policy: &NamedSessionPolicy,
) -> Session {
    let (check_in, check_out) = match bucket.as_slice() {
        [] => (None, None),
        [only] => {
            let offset = template.start.minutes_until(*only);
            let plausible = -policy.single_lead <= offset && offset <= policy.single_grace;
            (plausible.then_some(*only), None)
        }
        [first, second, ..] => {
            let check_in = if template.start.minutes_until(*first) < -policy.early_in_tolerance {
                *second
            } else {
                *first
            };
            (Some(check_in), pick_check_out(check_in, &bucket, policy))
        }
    };

    Session::new(template.name, template.start, bucket, check_in, check_out)
}

/// Latest punch comfortably after the check-in, else any later punch.
fn pick_check_out(
    check_in: TimeToken,
    bucket: &[TimeToken],
    policy: &NamedSessionPolicy,
) -> Option<TimeToken> {
    bucket
        .iter()
        .rev()
        .copied()
        .find(|&punch| check_in.minutes_until(punch) > policy.min_out_gap)
        .or_else(|| bucket.last().copied().filter(|&last| last > check_in))
}
