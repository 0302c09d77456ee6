//! `expand` command: prints the occurrences of an events file.

use chrono::Utc;
use eventfold_core::{
    GenerationLimits, Occurrence, OccurrenceGenerator, RangeFilter, RangeMode, SortOrder,
    parse_date, sort_occurrences,
};
use eventfold_protocol::WireEvent;
use eventfold_sources::local::{LOCAL_SOURCE_ID, MemoryStore};
use tracing::warn;

use crate::cli::ExpandArgs;
use crate::error::{ClientError, ClientResult};

/// Expands every event of `store` selected by `args`, oldest first.
///
/// Recurring events yield their generated occurrences, the others their
/// single occurrence. Without an explicit range nothing is filtered out.
pub fn expand(
    store: &MemoryStore,
    args: &ExpandArgs,
    limits: GenerationLimits,
) -> ClientResult<Vec<Occurrence>> {
    let range = explicit_range(args)?;
    let generator = OccurrenceGenerator::new(limits);

    let events: Vec<_> = match args.id {
        Some(ref id) => {
            let event = store
                .get(id)
                .ok_or_else(|| ClientError::Request(format!("no event with id {:?}", id)))?;
            vec![event.clone()]
        }
        None => store.events().to_vec(),
    };

    let mut occurrences = Vec::new();
    for event in &events {
        if event.is_recurring() {
            match generator.expand(event) {
                Ok(expanded) => occurrences.extend(expanded),
                Err(e) if args.id.is_some() => {
                    return Err(ClientError::Request(format!(
                        "event {:?} cannot be expanded: {}",
                        event.id, e
                    )));
                }
                Err(e) => warn!(event = %event.id, error = %e, "Skipping recurring event"),
            }
        } else if event.start_date.is_some() {
            occurrences.push(Occurrence::single(event));
        }
    }

    for occurrence in &mut occurrences {
        occurrence.source_id = LOCAL_SOURCE_ID.to_string();
    }
    if let Some(range) = range {
        range.retain(&mut occurrences);
    }
    sort_occurrences(&mut occurrences, SortOrder::Asc);
    Ok(occurrences)
}

fn explicit_range(args: &ExpandArgs) -> ClientResult<Option<RangeFilter>> {
    let (Some(start), Some(end)) = (args.start_date.as_deref(), args.end_date.as_deref()) else {
        return Ok(None);
    };
    let parse = |value: &str| {
        parse_date(value).ok_or_else(|| ClientError::Request(format!("invalid date: {:?}", value)))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if start > end {
        return Err(ClientError::Request(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok(Some(RangeFilter::new(
        RangeMode::Explicit { start, end },
        Utc::now().date_naive(),
    )))
}

/// Loads the events file and prints its occurrences as a JSON array.
pub fn run(args: &ExpandArgs, limits: GenerationLimits) -> ClientResult<()> {
    let store = MemoryStore::load(&args.file)?;
    let occurrences = expand(&store, args, limits)?;
    let wire: Vec<WireEvent> = occurrences.iter().map(WireEvent::from).collect();
    println!("{}", serde_json::to_string_pretty(&wire)?);
    Ok(())
}
