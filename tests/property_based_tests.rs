mod common;

use common::strategies::*;
use proptest::prelude::*;

use creation_log_duplicator::{
    BatchPlanner, ColumnId, CreationLogExtractor, RunState, WriteDescriptor,
};
use creation_log_duplicator::state_machine::{RunStateEvent, RunStateMachine};

fn event_strategy() -> impl Strategy<Value = RunStateEvent> {
    prop_oneof![
        Just(RunStateEvent::Start),
        Just(RunStateEvent::Complete),
        "[a-z ]{0,16}".prop_map(RunStateEvent::Fail),
    ]
}

proptest! {
    /// Property: Batches partition the writes exactly, in order
    #[test]
    fn batches_preserve_every_write_in_order(
        descriptors in descriptors_strategy(),
        batch_size in 1usize..120,
    ) {
        let planner = BatchPlanner::new(batch_size).unwrap();
        let batches = planner.plan(descriptors.clone());

        let flattened: Vec<WriteDescriptor> = batches
            .iter()
            .flat_map(|b| b.descriptors.iter().cloned())
            .collect();
        prop_assert_eq!(flattened, descriptors.clone());
        prop_assert_eq!(batches.len(), descriptors.len().div_ceil(batch_size));
        prop_assert_eq!(batches.len(), planner.batch_count(descriptors.len()));
    }

    /// Property: Every batch but the last is full, and none is empty
    #[test]
    fn batches_are_full_except_the_last(
        descriptors in descriptors_strategy(),
        batch_size in 1usize..120,
    ) {
        let batches = BatchPlanner::new(batch_size).unwrap().plan(descriptors);

        for (index, batch) in batches.iter().enumerate() {
            prop_assert!(!batch.is_empty());
            prop_assert!(batch.len() <= batch_size);
            prop_assert_eq!(batch.number, index + 1);
            prop_assert_eq!(batch.offset, index * batch_size);
            if index + 1 < batches.len() {
                prop_assert_eq!(batch.len(), batch_size);
            }
        }
    }

    /// Property: Extraction yields one write per sub-record with a creation-log value
    #[test]
    fn extraction_matches_flagged_sub_records(records in records_strategy()) {
        let extractor = CreationLogExtractor::new("creation_log");
        let target = ColumnId::new("date4");
        let writes = extractor.extract(&records, &target);

        let flagged: Vec<_> = records
            .iter()
            .flat_map(|r| r.subrecords.iter())
            .filter_map(|sub| {
                sub.column_values
                    .iter()
                    .find(|cv| cv.has_type("creation_log"))
                    .and_then(|cv| cv.non_empty_value())
                    .map(|value| (sub.id.clone(), sub.parent_collection_id.clone(), value.to_string()))
            })
            .collect();

        prop_assert_eq!(writes.len(), flagged.len());
        for (write, (id, board, value)) in writes.iter().zip(flagged) {
            prop_assert_eq!(&write.sub_record_id, &id);
            prop_assert_eq!(&write.collection_id, &board);
            prop_assert_eq!(&write.value, &value);
            prop_assert_eq!(&write.target_column_id, &target);
        }
    }

    /// Property: Extracting twice from the same records plans the same batches
    #[test]
    fn extraction_is_deterministic(records in records_strategy()) {
        let extractor = CreationLogExtractor::new("creation_log");
        let target = ColumnId::new("date4");
        let planner = BatchPlanner::default();

        let first = planner.plan(extractor.extract(&records, &target));
        let second = planner.plan(extractor.extract(&records, &target));
        prop_assert_eq!(first, second);
    }

    /// Property: Terminal states accept no further events
    #[test]
    fn terminal_states_are_final(event in event_strategy()) {
        for state in [RunState::Succeeded, RunState::Failed] {
            prop_assert!(RunStateMachine::determine_target_state(state, &event).is_err());
        }
    }

    /// Property: Any accepted event sequence moves forward and ends terminal at most once
    #[test]
    fn accepted_transitions_never_leave_terminal(events in prop::collection::vec(event_strategy(), 0..8)) {
        let mut state = RunState::Idle;
        for event in &events {
            match RunStateMachine::determine_target_state(state, event) {
                Ok(next) => {
                    prop_assert!(!state.is_terminal());
                    prop_assert_ne!(next, RunState::Idle);
                    state = next;
                }
                Err(_) => prop_assert!(
                    state.is_terminal()
                        || matches!((state, event), (RunState::Idle, RunStateEvent::Complete))
                        || matches!((state, event), (RunState::Running, RunStateEvent::Start))
                ),
            }
        }
    }
}
