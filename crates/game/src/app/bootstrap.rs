use std::fs;

use layouts::{
    parse_layout_map, resolve_app_paths, ItemCatalog, ItemId, ItemPool, ItemPrototype, ItemSize,
    LayoutCatalog, LayoutKind, LayoutPrototype, LayoutRegistry, LevelAssembly, LevelWorld,
    Transform, Vec3,
};
use tracing::info;

const DEMO_MAP_FILE: &str = "demo_map.json";

pub(crate) struct LevelRuntime {
    pub(crate) world: LevelWorld,
    pub(crate) registry: LayoutRegistry,
    pub(crate) items: ItemPool,
    pub(crate) assembly: LevelAssembly,
}

pub(crate) fn build_runtime(rng_seed: u64) -> Result<LevelRuntime, String> {
    let paths = resolve_app_paths().map_err(|error| format!("resolve app paths: {error}"))?;
    let map_path = paths.assets_dir.join(DEMO_MAP_FILE);
    let raw = fs::read_to_string(&map_path)
        .map_err(|error| format!("read map '{}': {error}", map_path.display()))?;
    let map = parse_layout_map(&raw).map_err(|error| format!("load map: {error}"))?;

    let mut world = LevelWorld::new();
    let registry = LayoutRegistry::new(layout_catalog(), &mut world);
    let items = ItemPool::new(item_catalog(), rng_seed);
    let assembly = LevelAssembly::new(&map);

    info!(
        map_entries = assembly.map_len(),
        rng_seed,
        "level_runtime_ready"
    );
    Ok(LevelRuntime {
        world,
        registry,
        items,
        assembly,
    })
}

fn layout_catalog() -> LayoutCatalog {
    LayoutCatalog::from_prototypes(vec![
        main_hall(),
        straight_hall(LayoutKind::StraightHallModern),
        straight_hall(LayoutKind::StraightHallVintage),
        straight_hall(LayoutKind::StraightHallDerelict),
        straight_hall(LayoutKind::StraightHallClinical),
        tee_hall(LayoutKind::TeeHallModern),
        tee_hall(LayoutKind::TeeHallVintage),
        tee_hall(LayoutKind::TeeHallDerelict),
        elbow_hall(LayoutKind::ElbowLeftModern, 90.0),
        elbow_hall(LayoutKind::ElbowLeftVintage, 90.0),
        elbow_hall(LayoutKind::ElbowRightModern, -90.0),
        elbow_hall(LayoutKind::ElbowRightVintage, -90.0),
        room(LayoutKind::StudyModern),
        room(LayoutKind::BedroomVintage),
        room(LayoutKind::WashroomDerelict),
        room(LayoutKind::CellClinical),
    ])
}

fn main_hall() -> LayoutPrototype {
    LayoutPrototype {
        kind: LayoutKind::MainHall,
        door_rotations: vec![Vec3::ZERO],
        next_offsets: vec![Vec3::new(12.0, 0.0, 0.0)],
        next_rotations: vec![Vec3::ZERO],
        small_anchors: vec![
            Vec3::new(2.0, 1.4, 2.6),
            Vec3::new(5.0, 1.4, -2.6),
            Vec3::new(8.0, 0.0, 2.2),
        ],
        medium_anchors: vec![Vec3::new(3.5, 0.0, 2.0), Vec3::new(7.0, 0.0, -2.0)],
        large_anchors: vec![Vec3::new(5.0, 0.0, 0.0), Vec3::new(9.5, 0.0, 1.5)],
    }
}

fn straight_hall(kind: LayoutKind) -> LayoutPrototype {
    LayoutPrototype {
        kind,
        door_rotations: vec![Vec3::ZERO],
        next_offsets: vec![Vec3::new(8.0, 0.0, 0.0)],
        next_rotations: vec![Vec3::ZERO],
        small_anchors: vec![Vec3::new(2.0, 1.4, 1.1), Vec3::new(6.0, 1.4, -1.1)],
        medium_anchors: vec![Vec3::new(4.0, 0.0, 1.0)],
        large_anchors: vec![Vec3::new(4.0, 0.0, -1.0)],
    }
}

fn tee_hall(kind: LayoutKind) -> LayoutPrototype {
    LayoutPrototype {
        kind,
        door_rotations: vec![Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0)],
        next_offsets: vec![Vec3::new(8.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 6.0)],
        next_rotations: vec![Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0)],
        small_anchors: vec![Vec3::new(2.0, 1.4, 1.1), Vec3::new(4.0, 2.6, 0.0)],
        medium_anchors: vec![Vec3::new(6.0, 0.0, -1.0)],
        large_anchors: vec![Vec3::new(4.0, 0.0, -1.2)],
    }
}

fn elbow_hall(kind: LayoutKind, turn_degrees: f32) -> LayoutPrototype {
    LayoutPrototype {
        kind,
        door_rotations: vec![Vec3::new(0.0, turn_degrees, 0.0)],
        next_offsets: vec![Vec3::new(5.0, 0.0, turn_degrees.signum() * 5.0)],
        next_rotations: vec![Vec3::new(0.0, turn_degrees, 0.0)],
        small_anchors: vec![Vec3::new(1.5, 1.4, 1.1)],
        medium_anchors: vec![Vec3::new(4.0, 0.0, 1.0)],
        large_anchors: vec![Vec3::new(4.5, 0.0, -0.5)],
    }
}

// Dead-end rooms: no exit doors, dense anchor coverage.
fn room(kind: LayoutKind) -> LayoutPrototype {
    LayoutPrototype {
        kind,
        door_rotations: Vec::new(),
        next_offsets: Vec::new(),
        next_rotations: Vec::new(),
        small_anchors: vec![
            Vec3::new(1.0, 1.4, 2.4),
            Vec3::new(2.5, 1.4, -2.4),
            Vec3::new(4.0, 2.6, 0.0),
            Vec3::new(4.5, 0.0, 2.0),
        ],
        medium_anchors: vec![
            Vec3::new(1.5, 0.0, 1.8),
            Vec3::new(3.0, 0.0, -1.8),
            Vec3::new(4.5, 0.0, 0.0),
        ],
        large_anchors: vec![Vec3::new(2.5, 0.0, 0.0), Vec3::new(4.0, 0.0, -2.0)],
    }
}

fn item_catalog() -> ItemCatalog {
    ItemCatalog::from_prototypes(vec![
        floor_item(1, ItemSize::Large, 0.0),
        floor_item(2, ItemSize::Large, 180.0),
        floor_item(10, ItemSize::Large, 90.0),
        floor_item(3, ItemSize::Medium, 0.0),
        spinning_item(4, ItemSize::Medium),
        inherit_scale_item(7, ItemSize::Medium),
        wall_item(5, ItemSize::Small),
        wall_item(6, ItemSize::Small),
        wall_item(9, ItemSize::Small),
        spinning_item(8, ItemSize::Small),
        spinning_item(11, ItemSize::Small),
        floor_item(13, ItemSize::Medium, 270.0),
    ])
}

fn floor_item(id: u32, size: ItemSize, yaw_degrees: f32) -> ItemPrototype {
    ItemPrototype {
        id: ItemId(id),
        enable: true,
        size,
        transform: Transform {
            position: Vec3::ZERO,
            rotation_euler_degrees: Vec3::new(0.0, yaw_degrees, 0.0),
            scale: Vec3::ONE,
        },
        random_rot_x: false,
        random_rot_y: false,
        random_rot_z: false,
        compatible_kinds: Vec::new(),
    }
}

fn spinning_item(id: u32, size: ItemSize) -> ItemPrototype {
    ItemPrototype {
        random_rot_y: true,
        ..floor_item(id, size, 0.0)
    }
}

// Zero prototype scale: the placed instance keeps whatever scale it
// currently has.
fn inherit_scale_item(id: u32, size: ItemSize) -> ItemPrototype {
    let mut prototype = floor_item(id, size, 0.0);
    prototype.transform.scale = Vec3::ZERO;
    prototype
}

fn wall_item(id: u32, size: ItemSize) -> ItemPrototype {
    ItemPrototype {
        id: ItemId(id),
        enable: true,
        size,
        transform: Transform {
            position: Vec3::new(0.0, 0.1, 0.0),
            rotation_euler_degrees: Vec3::ZERO,
            scale: Vec3::ONE,
        },
        random_rot_x: false,
        random_rot_y: false,
        random_rot_z: false,
        compatible_kinds: Vec::new(),
    }
}
