//! Property tests for connection assembly over the in-memory executer
//!
//! Rows are their own offsets (`0..len`), so every page can be checked
//! against a plain slice of the sequence.

use futures::executor::block_on;
use proptest::prelude::*;
use relay_orm::{
    ComputationFlags, Connection, MemoryExecuter, PageWindowRequest, VecQuery, assemble_connection,
};

fn assemble(len: i64, request: PageWindowRequest, flags: ComputationFlags) -> Connection<i64> {
    let executer = MemoryExecuter::new();
    let rows: Vec<i64> = (0..len).collect();
    block_on(assemble_connection(&executer, VecQuery::new(rows), request, flags)).unwrap()
}

fn page(conn: &Connection<i64>) -> Vec<i64> {
    conn.nodes().into_iter().copied().collect()
}

fn flags() -> ComputationFlags {
    ComputationFlags::all()
}

proptest! {
    #[test]
    fn first_only_takes_from_the_front(len in 0i64..40, first in 0i64..50) {
        let conn = assemble(len, PageWindowRequest::first(first), flags());

        prop_assert_eq!(page(&conn), (0..first.min(len)).collect::<Vec<_>>());
        prop_assert_eq!(conn.page_info.has_next_page, len > first);
        prop_assert!(!conn.page_info.has_previous_page);
        prop_assert_eq!(conn.total_count, Some(len));
    }

    #[test]
    fn after_only_starts_past_the_cursor(len in 0i64..40, after in 0i64..50) {
        let conn = assemble(len, PageWindowRequest::default().with_after(after), flags());

        prop_assert_eq!(page(&conn), ((after + 1)..len).collect::<Vec<_>>());
        // The cursor row itself must exist to claim a previous page.
        prop_assert_eq!(conn.page_info.has_previous_page, after < len);
        prop_assert!(!conn.page_info.has_next_page);
    }

    #[test]
    fn between_cursors_is_exclusive(
        len in 0i64..40,
        after in 0i64..45,
        gap in 1i64..45,
        first in proptest::option::of(0i64..20),
        last in proptest::option::of(0i64..20),
    ) {
        prop_assume!(first.is_none() || last.is_none());
        let before = after + gap;
        let request = PageWindowRequest::new(first, last, Some(before), Some(after));
        let conn = assemble(len, request, flags());

        let mut expected: Vec<i64> = ((after + 1)..before.min(len)).collect();
        if let Some(first) = first {
            expected.truncate(first as usize);
        }
        if let Some(last) = last {
            let excess = expected.len().saturating_sub(last as usize);
            expected.drain(..excess);
        }

        prop_assert_eq!(page(&conn), expected.clone());
        if let Some(start) = expected.first() {
            prop_assert_eq!(conn.page_info.start_cursor.clone(), Some(start.to_string()));
        }
        if let Some(end) = expected.last() {
            prop_assert_eq!(conn.page_info.end_cursor.clone(), Some(end.to_string()));
        }
    }

    #[test]
    fn skip_exhausting_the_sequence_yields_an_empty_page(
        len in 0i64..30,
        overshoot in 0i64..5,
        first in 0i64..10,
    ) {
        // `after` on the last row or beyond it.
        let after = (len - 1).max(0) + overshoot;
        let conn = assemble(len, PageWindowRequest::first(first).with_after(after), flags());

        prop_assert!(page(&conn).is_empty());
        // A cursor past the end cannot be found, but rows beyond a full
        // page still exist when the sequence outgrows it.
        prop_assert_eq!(conn.page_info.has_next_page, after >= len && len > first);
        prop_assert_eq!(conn.page_info.has_previous_page, after < len);
        prop_assert_eq!(conn.page_info.start_cursor.clone(), None);
        prop_assert_eq!(conn.page_info.end_cursor.clone(), None);
        prop_assert_eq!(conn.total_count, Some(len));
    }

    #[test]
    fn huge_cursors_never_overflow(len in 0i64..20, first in proptest::option::of(0i64..10), back in 0i64..3) {
        let after = i64::MAX - back;
        let request = PageWindowRequest::new(first, None, None, Some(after));
        let conn = assemble(len, request, flags());

        prop_assert!(page(&conn).is_empty());
        prop_assert!(!conn.page_info.has_previous_page);
        prop_assert_eq!(conn.total_count, Some(len));
    }

    #[test]
    fn walking_forward_visits_every_row_once(len in 0i64..40, size in 1i64..8) {
        let mut seen = Vec::new();
        let mut request = PageWindowRequest::first(size);

        loop {
            let conn = assemble(len, request, flags());
            seen.extend(page(&conn));
            if !conn.page_info.has_next_page {
                break;
            }
            let end = conn.page_info.end_cursor.as_deref().and_then(|c| c.parse().ok());
            prop_assert!(end.is_some());
            request = PageWindowRequest::first(size).with_after(end.unwrap_or_default());
        }

        prop_assert_eq!(seen, (0..len).collect::<Vec<_>>());
    }

    #[test]
    fn walking_backward_visits_every_row_once(len in 0i64..40, size in 1i64..8) {
        let mut pages = Vec::new();
        let mut request = PageWindowRequest::last(size);

        loop {
            let conn = assemble(len, request, flags());
            pages.push(page(&conn));
            if !conn.page_info.has_previous_page {
                break;
            }
            let start = conn.page_info.start_cursor.as_deref().and_then(|c| c.parse().ok());
            prop_assert!(start.is_some());
            request = PageWindowRequest::last(size).with_before(start.unwrap_or_default());
        }

        let seen: Vec<i64> = pages.into_iter().rev().flatten().collect();
        prop_assert_eq!(seen, (0..len).collect::<Vec<_>>());
    }

    #[test]
    fn assembling_twice_gives_the_same_connection(
        len in 0i64..30,
        first in proptest::option::of(0i64..10),
        after in proptest::option::of(0i64..35),
        before in proptest::option::of(0i64..35),
    ) {
        let request = PageWindowRequest::new(first, None, before, after);
        prop_assert_eq!(assemble(len, request, flags()), assemble(len, request, flags()));
    }
}
