use std::time::Duration;

use sg_core::{
    AtmosOptions, FrameContext, GridId, GridRegistry, LocalPos, NodeGraph, NodeType, Placement,
    RoomGraphBuilder, StationRegistry, Tile, TileKind, TileLayer, TileMap, UpdateList,
};

const SHIP: GridId = GridId(0);
const SHUTTLE: GridId = GridId(1);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tile(x: i32, y: i32) -> Tile {
    Tile::new(SHIP, x, y)
}

fn registry_with(grids: &[(GridId, &str, Placement)]) -> StationRegistry {
    let mut registry = StationRegistry::new();
    for &(id, map, placement) in grids {
        registry
            .add_grid(id, TileLayer::from_ascii(map).unwrap(), placement)
            .unwrap();
    }
    registry
}

fn builder_for(registry: &StationRegistry, grid: GridId) -> RoomGraphBuilder {
    RoomGraphBuilder::new(grid, registry, AtmosOptions::default()).unwrap()
}

fn set_tile(registry: &mut StationRegistry, at: Tile, kind: TileKind) {
    registry
        .layer_mut(at.grid)
        .unwrap()
        .set(LocalPos::new(at.x, at.y), kind);
}

const SEALED: &str = "
#####
#...#
#...#
#...#
#####
";

const OPEN_SOUTH: &str = "
#####
#...#
#...#
#...#
#~~~#
";

#[test]
fn test_fully_exposed_square_stays_open() {
    init_logging();
    let registry = registry_with(&[(SHIP, "...\n...\n...", Placement::default())]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    let report = builder.initialize(&registry, &mut graph);

    assert_eq!(report.rooms, 0);
    assert_eq!(report.open_tiles, 9);
    assert_eq!(
        graph.render_classification(SHIP, registry.layer(SHIP).unwrap().bounds()),
        "???\n???\n???\n"
    );
    let boundary: Vec<Tile> = builder.boundary_tiles(&graph).collect();
    assert_eq!(boundary.len(), 8);
    assert!(!boundary.contains(&tile(1, 1)));
    // Interior still links everywhere so later updates see the topology
    assert_eq!(graph.neighbors_of(tile(1, 1)).len(), 4);
}

#[test]
fn test_walls_seal_the_square() {
    init_logging();
    let registry = registry_with(&[(SHIP, SEALED, Placement::default())]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    let report = builder.initialize(&registry, &mut graph);

    assert_eq!(report.rooms, 1);
    assert_eq!(report.room_tiles, 9);
    assert_eq!(report.occupied_tiles, 16);
    assert_eq!(report.boundary_tiles, 0);
    assert_eq!(
        graph.render_classification(SHIP, registry.layer(SHIP).unwrap().bounds()),
        "#####\n#...#\n#...#\n#...#\n#####\n"
    );
}

#[test]
fn test_single_open_edge_leaks_whole_area() {
    init_logging();
    let registry = registry_with(&[(SHIP, OPEN_SOUTH, Placement::default())]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    builder.initialize(&registry, &mut graph);

    for y in 1..=3 {
        for x in 1..=3 {
            assert_eq!(graph.classification_of(tile(x, y)), NodeType::Unset);
        }
    }
    let boundary: Vec<Tile> = builder.boundary_tiles(&graph).collect();
    assert_eq!(boundary, vec![tile(1, 1), tile(2, 1), tile(3, 1)]);
}

#[test]
fn test_gap_covered_by_another_grid_is_sealed() {
    init_logging();
    // A plate of hull on a second grid sits right over the missing wall
    let registry = registry_with(&[
        (SHIP, OPEN_SOUTH, Placement::default()),
        (SHUTTLE, "###", Placement::at(1, 0)),
    ]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    builder.initialize(&registry, &mut graph);

    assert_eq!(graph.classification_of(tile(2, 2)), NodeType::Room);
    assert_eq!(builder.boundary_len(&graph), 0);
    // Hull is not passable, so no edge crosses into it
    assert_eq!(graph.neighbors_of(tile(2, 1)), vec![tile(1, 1), tile(3, 1), tile(2, 2)]);
}

#[test]
fn test_docked_grids_link_across() {
    init_logging();
    let ship = "
#####
#...
#####
";
    let shuttle = "
#####
....#
#####
";
    let mut registry = registry_with(&[
        (SHIP, ship, Placement::default()),
        (SHUTTLE, shuttle, Placement::at(4, 0)),
    ]);
    let mut graph = NodeGraph::new();
    let mut ship_builder = builder_for(&registry, SHIP);
    let mut shuttle_builder = builder_for(&registry, SHUTTLE);
    ship_builder.initialize(&registry, &mut graph);
    shuttle_builder.initialize(&registry, &mut graph);

    let airlock = tile(3, 1);
    let hatch = Tile::new(SHUTTLE, 0, 1);
    assert_eq!(graph.classification_of(airlock), NodeType::Room);
    assert_eq!(graph.classification_of(hatch), NodeType::Room);
    assert!(graph.neighbors_of(airlock).contains(&hatch));
    assert!(graph.neighbors_of(hatch).contains(&airlock));
    assert!(!ship_builder.is_boundary(&graph, airlock));
    assert!(!shuttle_builder.is_boundary(&graph, hatch));
    assert!(graph.is_symmetric());

    // Undock: the airlock now faces vacuum
    registry
        .set_placement(SHUTTLE, Placement::at(20, 0))
        .unwrap();
    let kind = ship_builder.incremental_update(&registry, &mut graph, airlock);
    assert_eq!(kind, NodeType::Space);
    assert!(ship_builder.is_boundary(&graph, airlock));
    assert!(!graph.neighbors_of(hatch).contains(&airlock));
    assert!(graph.is_symmetric());
}

#[test]
fn test_breach_on_one_grid_exposes_docked_grid() {
    init_logging();
    let ship = "
#####
#...
#####
";
    let shuttle = "
#####
....#
#####
";
    let mut registry = registry_with(&[
        (SHIP, ship, Placement::default()),
        (SHUTTLE, shuttle, Placement::at(4, 0)),
    ]);
    let mut graph = NodeGraph::new();
    let mut ship_builder = builder_for(&registry, SHIP);
    let mut shuttle_builder = builder_for(&registry, SHUTTLE);
    ship_builder.initialize(&registry, &mut graph);
    shuttle_builder.initialize(&registry, &mut graph);

    let airlock = tile(3, 1);
    let hatch = Tile::new(SHUTTLE, 0, 1);
    assert!(!shuttle_builder.is_boundary(&graph, hatch));

    set_tile(&mut registry, airlock, TileKind::Space);
    ship_builder.incremental_update(&registry, &mut graph, airlock);

    assert!(shuttle_builder.is_boundary(&graph, hatch));
    assert_eq!(
        shuttle_builder.boundary_tiles(&graph).collect::<Vec<_>>(),
        vec![hatch]
    );
    assert!(!ship_builder.is_boundary(&graph, hatch));
    assert!(graph.neighbors_of(hatch).iter().all(|t| t.grid == SHUTTLE));
    let mut updates = UpdateList::new();
    assert_eq!(
        shuttle_builder.tick(&graph, &FrameContext::default(), &mut updates),
        1
    );

    set_tile(&mut registry, airlock, TileKind::Floor);
    assert_eq!(
        ship_builder.incremental_update(&registry, &mut graph, airlock),
        NodeType::Room
    );
    assert!(!shuttle_builder.is_boundary(&graph, hatch));
    assert!(graph.neighbors_of(hatch).contains(&airlock));
    assert!(graph.is_symmetric());
}

#[test]
fn test_rotated_dock_resolves_through_world() {
    init_logging();
    let ship = "
###
#..
###
";
    // Turned a quarter: local row y=0 runs down the world column x=3
    let mut shuttle = TileLayer::new(3, 3, TileKind::Wall).unwrap();
    shuttle.set(LocalPos::new(0, 0), TileKind::Floor);
    shuttle.set(LocalPos::new(1, 0), TileKind::Floor);
    let mut registry = registry_with(&[(SHIP, ship, Placement::default())]);
    registry
        .add_grid(
            SHUTTLE,
            shuttle,
            Placement::at(3, 1).rotated(sg_core::Rotation::R270),
        )
        .unwrap();
    assert_eq!(
        registry.world_to_local(sg_core::WorldPos::new(3, 1), SHUTTLE),
        Some(LocalPos::new(0, 0))
    );

    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    builder.initialize(&registry, &mut graph);

    assert!(graph
        .neighbors_of(tile(2, 1))
        .contains(&Tile::new(SHUTTLE, 0, 0)));
    assert!(!builder.is_boundary(&graph, tile(2, 1)));
}

#[test]
fn test_toggle_interior_restores_sealed_room() {
    init_logging();
    let mut registry = registry_with(&[(SHIP, SEALED, Placement::default())]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    builder.initialize(&registry, &mut graph);
    let before = graph.snapshot(SHIP);

    let center = tile(2, 2);
    set_tile(&mut registry, center, TileKind::Wall);
    assert_eq!(
        builder.incremental_update(&registry, &mut graph, center),
        NodeType::Occupied
    );
    assert!(graph.neighbors_of(center).is_empty());
    assert!(!graph.neighbors_of(tile(2, 1)).contains(&center));

    set_tile(&mut registry, center, TileKind::Floor);
    assert_eq!(
        builder.incremental_update(&registry, &mut graph, center),
        NodeType::Room
    );

    assert_eq!(graph.snapshot(SHIP), before);
}

#[test]
fn test_toggle_interior_restores_open_area() {
    init_logging();
    let mut registry = registry_with(&[(SHIP, OPEN_SOUTH, Placement::default())]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    builder.initialize(&registry, &mut graph);
    let before = graph.snapshot(SHIP);
    let boundary_before: Vec<Tile> = builder.boundary_tiles(&graph).collect();

    let center = tile(2, 2);
    set_tile(&mut registry, center, TileKind::DoorClosed);
    builder.incremental_update(&registry, &mut graph, center);
    set_tile(&mut registry, center, TileKind::DoorOpen);
    assert_eq!(
        builder.incremental_update(&registry, &mut graph, center),
        NodeType::Unset
    );

    assert_eq!(graph.snapshot(SHIP), before);
    assert_eq!(builder.boundary_tiles(&graph).collect::<Vec<_>>(), boundary_before);
}

#[test]
fn test_incremental_update_does_not_reflood() {
    init_logging();
    let mut registry = registry_with(&[(SHIP, OPEN_SOUTH, Placement::default())]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    builder.initialize(&registry, &mut graph);

    // Patch the hole one plate at a time
    for x in 1..=3 {
        let at = tile(x, 0);
        set_tile(&mut registry, at, TileKind::Wall);
        builder.incremental_update(&registry, &mut graph, at);
    }
    assert_eq!(builder.boundary_len(&graph), 0);
    // The area is sealed now, but only a fresh discovery pass says so
    assert_eq!(graph.classification_of(tile(2, 2)), NodeType::Unset);

    let assignment = builder
        .discover_at(&registry, &mut graph, tile(2, 2))
        .unwrap();
    assert!(assignment.sealed);
    assert_eq!(assignment.tiles.len(), 9);
    assert_eq!(assignment.tiles[0], tile(2, 2));
    assert_eq!(graph.classification_of(tile(1, 1)), NodeType::Room);
}

#[test]
fn test_tick_broadcasts_every_frame() {
    init_logging();
    let registry = registry_with(&[(SHIP, OPEN_SOUTH, Placement::default())]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    builder.initialize(&registry, &mut graph);

    let mut updates = UpdateList::new();
    let frame = FrameContext::new(1, Duration::from_millis(16));
    assert_eq!(builder.tick(&graph, &frame, &mut updates), 3);
    // Still pending from the previous frame: not queued twice
    assert_eq!(builder.tick(&graph, &FrameContext::new(2, frame.delta), &mut updates), 3);
    assert_eq!(updates.len(), 3);
    assert_eq!(updates.drain(), vec![tile(1, 1), tile(2, 1), tile(3, 1)]);

    builder.tick(&graph, &FrameContext::new(3, frame.delta), &mut updates);
    assert_eq!(updates.len(), 3);
}

#[test]
fn test_snapshot_json_round_trip() {
    let registry = registry_with(&[(SHIP, OPEN_SOUTH, Placement::default())]);
    let mut graph = NodeGraph::new();
    let mut builder = builder_for(&registry, SHIP);
    builder.initialize(&registry, &mut graph);

    let snapshot = graph.snapshot(SHIP);
    let json = snapshot.to_json().unwrap();
    let back: sg_core::GraphSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
    assert!(back.node(tile(2, 1)).unwrap().boundary);
    assert_eq!(back.node(tile(0, 0)).unwrap().kind, NodeType::Occupied);
}

#[test]
fn test_options_from_file() {
    let path = std::env::temp_dir().join(format!("sg-core-options-{}.rc", std::process::id()));
    std::fs::write(&path, "# test\nOPTIONS=priority:12,!report_init_timing\n").unwrap();
    let options = AtmosOptions::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(options.priority, 12);
    assert!(!options.report_init_timing);

    let registry = registry_with(&[(SHIP, SEALED, Placement::default())]);
    let builder = RoomGraphBuilder::new(SHIP, &registry, options).unwrap();
    assert_eq!(builder.priority(), 12);
}
