use chrono::NaiveDate;
use gtfs_graph::{
    compiler::GraphCompiler,
    error::Error,
    feed::{VecFeed, VecTransfers},
    geo::Coordinate,
    graph::{EdgeType, Graph, StubGraph},
    model::{Frequency, Route, Stop, StopTime, Trip},
    sidetables::TripInstanceKey,
    time::Time,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn simple_feed() -> VecFeed {
    VecFeed::new(date(2024, 1, 1), date(2024, 1, 1))
        .with_stop(Stop {
            id: "A".into(),
            coordinate: Coordinate::new(0.0, 0.0),
            location_type: 0,
        })
        .with_stop(Stop {
            id: "B".into(),
            coordinate: Coordinate::new(0.0, 0.01),
            location_type: 0,
        })
        .with_route(Route {
            id: "r1".into(),
            route_type: 3,
            agency_id: "ag".into(),
        })
        .with_agency_timezone("ag".into(), "Europe/Berlin".into())
        .with_service_dates("svc".into(), [date(2024, 1, 1)])
        .with_trip(Trip {
            id: "t1".into(),
            route_id: "r1".into(),
            block_id: None,
            service_id: "svc".into(),
        })
        .with_stop_time(StopTime {
            trip_id: "t1".into(),
            stop_sequence: 0,
            stop_id: "A".into(),
            arrival_time: Time::from_seconds(28_800),
            departure_time: Time::from_seconds(28_800),
        })
        .with_stop_time(StopTime {
            trip_id: "t1".into(),
            stop_sequence: 1,
            stop_id: "B".into(),
            arrival_time: Time::from_seconds(29_100),
            departure_time: Time::from_seconds(29_100),
        })
}

#[test]
fn single_trip_emits_board_alight_and_hop() {
    let feed = simple_feed();
    let transfers = VecTransfers::new();
    let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");

    compiler.create_trips(&feed, &transfers).unwrap();

    let key = TripInstanceKey {
        trip_id: "t1".into(),
        offset_secs: 0,
    };
    assert!(compiler.side_tables.board_edge(&key, 0).is_some());
    assert!(compiler.side_tables.alight_edge(&key, 1).is_some());
    assert!(compiler.side_tables.board_edge(&key, 1).is_some());
}

#[test]
fn mismatched_block_frequencies_are_fatal() {
    let feed = simple_feed()
        .with_trip(Trip {
            id: "t2".into(),
            route_id: "r1".into(),
            block_id: Some("blk".into()),
            service_id: "svc".into(),
        })
        .with_stop_time(StopTime {
            trip_id: "t2".into(),
            stop_sequence: 0,
            stop_id: "A".into(),
            arrival_time: Time::from_seconds(30_000),
            departure_time: Time::from_seconds(30_000),
        })
        .with_frequency(
            "t2".into(),
            Frequency {
                start_time: Time::from_seconds(0),
                end_time: Time::from_seconds(100),
                headway_secs: 10,
            },
        )
        .with_trip(Trip {
            id: "t3".into(),
            route_id: "r1".into(),
            block_id: Some("blk".into()),
            service_id: "svc".into(),
        })
        .with_stop_time(StopTime {
            trip_id: "t3".into(),
            stop_sequence: 0,
            stop_id: "A".into(),
            arrival_time: Time::from_seconds(31_000),
            departure_time: Time::from_seconds(31_000),
        })
        .with_frequency(
            "t3".into(),
            Frequency {
                start_time: Time::from_seconds(0),
                end_time: Time::from_seconds(100),
                headway_secs: 20,
            },
        );

    let transfers = VecTransfers::new();
    let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");
    let err = compiler.create_trips(&feed, &transfers);
    assert!(matches!(err, Err(Error::FrequencyBlockConflict)));
}

#[test]
fn frequency_expansion_emits_one_instance_per_headway_offset() {
    let feed = VecFeed::new(date(2024, 1, 1), date(2024, 1, 1))
        .with_stop(Stop {
            id: "A".into(),
            coordinate: Coordinate::new(0.0, 0.0),
            location_type: 0,
        })
        .with_stop(Stop {
            id: "B".into(),
            coordinate: Coordinate::new(0.0, 0.01),
            location_type: 0,
        })
        .with_route(Route {
            id: "r1".into(),
            route_type: 3,
            agency_id: "ag".into(),
        })
        .with_agency_timezone("ag".into(), "Europe/Berlin".into())
        .with_service_dates("svc".into(), [date(2024, 1, 1)])
        .with_trip(Trip {
            id: "t1".into(),
            route_id: "r1".into(),
            block_id: None,
            service_id: "svc".into(),
        })
        .with_stop_time(StopTime {
            trip_id: "t1".into(),
            stop_sequence: 0,
            stop_id: "A".into(),
            arrival_time: Time::from_seconds(0),
            departure_time: Time::from_seconds(0),
        })
        .with_stop_time(StopTime {
            trip_id: "t1".into(),
            stop_sequence: 1,
            stop_id: "B".into(),
            arrival_time: Time::from_seconds(300),
            departure_time: Time::from_seconds(300),
        })
        .with_frequency(
            "t1".into(),
            Frequency {
                start_time: Time::from_seconds(0),
                end_time: Time::from_seconds(600),
                headway_secs: 300,
            },
        );

    let transfers = VecTransfers::new();
    let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");
    compiler.create_trips(&feed, &transfers).unwrap();

    let offset0 = TripInstanceKey {
        trip_id: "t1".into(),
        offset_secs: 0,
    };
    let offset300 = TripInstanceKey {
        trip_id: "t1".into(),
        offset_secs: 300,
    };
    let offset600 = TripInstanceKey {
        trip_id: "t1".into(),
        offset_secs: 600,
    };
    assert!(compiler.side_tables.board_edge(&offset0, 0).is_some());
    assert!(compiler.side_tables.board_edge(&offset300, 0).is_some());
    // end is exclusive: offset 600 is never emitted.
    assert!(compiler.side_tables.board_edge(&offset600, 0).is_none());
}

#[test]
fn hop_time_matches_next_arrival_minus_prev_departure() {
    let feed = simple_feed();
    let transfers = VecTransfers::new();
    let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");
    compiler.create_trips(&feed, &transfers).unwrap();

    let key = TripInstanceKey {
        trip_id: "t1".into(),
        offset_secs: 0,
    };
    let board_a = compiler.side_tables.board_edge(&key, 0).unwrap();
    let (_, departure_a) = compiler.graph.edge_endpoints(board_a);
    let outgoing = compiler.graph.outgoing_edges(departure_a);
    let hop = outgoing
        .iter()
        .find(|&&e| matches!(compiler.graph.edge_attributes(e).edge_type, Some(EdgeType::Hop)))
        .copied()
        .unwrap();
    assert_eq!(compiler.graph.edge_attributes(hop).time, 300);
}

#[test]
fn block_continuation_wires_transfer_between_consecutive_trips() {
    let feed = simple_feed()
        .with_trip(Trip {
            id: "t2".into(),
            route_id: "r1".into(),
            block_id: Some("blk".into()),
            service_id: "svc".into(),
        })
        .with_stop_time(StopTime {
            trip_id: "t2".into(),
            stop_sequence: 0,
            stop_id: "B".into(),
            arrival_time: Time::from_seconds(29_100),
            departure_time: Time::from_seconds(29_100),
        })
        .with_stop_time(StopTime {
            trip_id: "t2".into(),
            stop_sequence: 1,
            stop_id: "A".into(),
            arrival_time: Time::from_seconds(29_400),
            departure_time: Time::from_seconds(29_400),
        });

    let transfers = VecTransfers::new();
    let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");
    compiler.create_trips(&feed, &transfers).unwrap();

    let key_t2 = TripInstanceKey {
        trip_id: "t2".into(),
        offset_secs: 0,
    };
    let board_t2 = compiler.side_tables.board_edge(&key_t2, 0).unwrap();
    let attrs = compiler.graph.edge_attributes(board_t2);
    assert!(matches!(attrs.edge_type, Some(EdgeType::Board)));
}
