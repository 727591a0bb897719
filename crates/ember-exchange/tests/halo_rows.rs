//! Integration test: which rows travel where, and what the receiver rejects.

use std::thread;
use std::time::Duration;

use ember_core::{Direction, ExchangeError, WorkerId};
use ember_exchange::{channel_mesh, ExchangeSchedule, HaloExchange, HaloMessage, Neighbours};
use ember_grid::{LocalGrid, Partition};
use ember_test_utils::{fields, ScriptedLink};

fn initialized(partition: &Partition) -> LocalGrid {
    let mut grid = LocalGrid::for_partition(partition);
    fields::ramp().fill(partition, &mut grid).unwrap();
    grid
}

#[test]
fn first_exchange_delivers_initial_boundary_rows() {
    let parts = Partition::decompose(4, 2).unwrap();
    let initial: Vec<LocalGrid> = parts.iter().map(initialized).collect();
    let mesh = channel_mesh(2, 1, Some(Duration::from_secs(5))).unwrap();

    let handles: Vec<_> = mesh
        .into_iter()
        .zip(initial.iter().cloned())
        .enumerate()
        .map(|(k, (neighbours, mut grid))| {
            thread::spawn(move || {
                // Poison the facing halos so only exchanged values can pass.
                if neighbours.up.is_some() {
                    grid.top_halo_mut().fill(f64::NAN);
                }
                if neighbours.down.is_some() {
                    grid.bottom_halo_mut().fill(f64::NAN);
                }
                HaloExchange::new(WorkerId(k as u32), ExchangeSchedule::SendFirst)
                    .exchange(&neighbours, &mut grid)
                    .unwrap();
                grid
            })
        })
        .collect();
    let exchanged: Vec<LocalGrid> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(exchanged[0].bottom_halo(), initial[1].first_owned_row());
    assert_eq!(exchanged[1].top_halo(), initial[0].last_owned_row());
    // Outward halos are untouched.
    assert_eq!(exchanged[0].top_halo(), initial[0].top_halo());
    assert_eq!(exchanged[1].bottom_halo(), initial[1].bottom_halo());
    // Owned rows are untouched.
    assert_eq!(exchanged[0].owned(), initial[0].owned());
    assert_eq!(exchanged[1].owned(), initial[1].owned());
}

fn middle_worker() -> (LocalGrid, ScriptedLink, ScriptedLink) {
    let partition = Partition::decompose(6, 3).unwrap().remove(1);
    let grid = initialized(&partition);
    let up = ScriptedLink::new(WorkerId(0), Direction::Up);
    let down = ScriptedLink::new(WorkerId(2), Direction::Down);
    (grid, up, down)
}

#[test]
fn sends_first_row_up_and_last_row_down() {
    let (mut grid, up, down) = middle_worker();
    up.push_row(vec![7.0; 6]);
    down.push_row(vec![9.0; 6]);
    let first = grid.first_owned_row().to_vec();
    let last = grid.last_owned_row().to_vec();

    let neighbours = Neighbours {
        up: Some(up.clone()),
        down: Some(down.clone()),
    };
    let stats = HaloExchange::new(WorkerId(1), ExchangeSchedule::OddEven)
        .exchange(&neighbours, &mut grid)
        .unwrap();

    assert_eq!((stats.sent, stats.received), (2, 2));
    assert_eq!(up.sent(), vec![first]);
    assert_eq!(down.sent(), vec![last]);
    assert_eq!(grid.top_halo(), &[7.0; 6]);
    assert_eq!(grid.bottom_halo(), &[9.0; 6]);
}

fn exchange_with(up: ScriptedLink, down: ScriptedLink, grid: &mut LocalGrid) -> ExchangeError {
    let neighbours = Neighbours {
        up: Some(up),
        down: Some(down),
    };
    HaloExchange::new(WorkerId(1), ExchangeSchedule::SendFirst)
        .exchange(&neighbours, grid)
        .unwrap_err()
}

#[test]
fn short_row_rejected() {
    let (mut grid, up, down) = middle_worker();
    up.push_row(vec![1.0; 5]);
    down.push_row(vec![1.0; 6]);
    assert_eq!(
        exchange_with(up, down, &mut grid),
        ExchangeError::PayloadSize {
            peer: WorkerId(0),
            expected: 6,
            actual: 5,
        }
    );
}

#[test]
fn row_from_wrong_sender_rejected() {
    let (mut grid, up, down) = middle_worker();
    up.push_message(HaloMessage {
        from: WorkerId(2),
        direction: Direction::Down,
        row: vec![0.0; 6],
    });
    assert_eq!(
        exchange_with(up, down, &mut grid),
        ExchangeError::UnexpectedSender {
            expected: WorkerId(0),
            actual: WorkerId(2),
        }
    );
}

#[test]
fn row_travelling_the_wrong_way_rejected() {
    let (mut grid, up, down) = middle_worker();
    up.push_message(HaloMessage {
        from: WorkerId(0),
        direction: Direction::Up,
        row: vec![0.0; 6],
    });
    assert!(matches!(
        exchange_with(up, down, &mut grid),
        ExchangeError::UnexpectedDirection { .. }
    ));
}

#[test]
fn silent_peer_reads_as_disconnected() {
    let (mut grid, up, down) = middle_worker();
    up.push_row(vec![0.0; 6]);
    let err = exchange_with(up, down.clone(), &mut grid);
    assert_eq!(err, ExchangeError::Disconnected { peer: WorkerId(2) });
    assert!(err.is_cascade());
    assert_eq!(down.pending(), 0);
}
