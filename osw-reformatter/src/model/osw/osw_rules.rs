use super::{
    field_table::FieldSpec,
    osw_subtype::{EntityCategory, OswSubtype},
    tag_value::TagSet,
};

pub type Predicate = fn(&TagSet, &EntityCategory) -> bool;

/// a subtype described as data: the predicate that selects it and the
/// fields it accepts. fields are grouped so common tables can be shared;
/// a key in a later group overrides the same key in an earlier one.
pub struct SubtypeRule {
    pub subtype: OswSubtype,
    pub predicate: Predicate,
    pub field_groups: &'static [&'static [FieldSpec]],
}

impl SubtypeRule {
    pub fn matches(&self, tags: &TagSet, category: &EntityCategory) -> bool {
        (self.predicate)(tags, category)
    }

    /// the field spec for a key, if this subtype accepts it
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.field_groups
            .iter()
            .rev()
            .flat_map(|group| group.iter())
            .find(|spec| spec.key == key)
    }

    /// all accepted fields, one entry per key
    pub fn fields(&self) -> Vec<&'static FieldSpec> {
        let mut out: Vec<&'static FieldSpec> = vec![];
        for spec in self.field_groups.iter().flat_map(|group| group.iter()) {
            match out.iter().position(|s| s.key == spec.key) {
                Some(idx) => out[idx] = spec,
                None => out.push(spec),
            }
        }
        out
    }
}

pub const SURFACES: &[&str] = &[
    "asphalt",
    "concrete",
    "concrete:plates",
    "concrete:lanes",
    "paved",
    "paving_stones",
    "sett",
    "cobblestone",
    "bricks",
    "gravel",
    "fine_gravel",
    "compacted",
    "dirt",
    "earth",
    "grass",
    "grass_paver",
    "ground",
    "metal",
    "wood",
    "rubber",
    "sand",
    "unpaved",
];

pub const CROSSING_MARKINGS: &[&str] = &[
    "yes",
    "no",
    "dashes",
    "dots",
    "lines",
    "ladder",
    "zebra",
    "ladder:skewed",
    "ladder:paired",
    "zebra:double",
    "zebra:paired",
    "zebra:bicolour",
    "lines:paired",
    "surface",
    "pictograms",
];

pub const KERBS: &[&str] = &["flush", "lowered", "rolled", "raised"];
pub const TACTILE_PAVING: &[&str] = &["yes", "no", "contrasted"];
pub const CLIMB: &[&str] = &["up", "down"];
pub const LEAF_TYPES: &[&str] = &["broadleaved", "needleleaved", "leafless", "mixed"];
pub const HYDRANT_TYPES: &[&str] = &["pillar", "underground", "wall", "pipe"];

pub const LINE_BARRIERS: &[&str] = &[
    "fence",
    "wall",
    "retaining_wall",
    "hedge",
    "guard_rail",
    "handrail",
    "city_wall",
    "kerb",
];

pub const POINT_AMENITIES: &[&str] = &[
    "bench",
    "waste_basket",
    "bicycle_parking",
    "drinking_water",
    "post_box",
    "telephone",
    "toilets",
    "vending_machine",
];

const EDGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("highway"),
    FieldSpec::float("width"),
    FieldSpec::enumerated("surface", SURFACES),
    FieldSpec::text("name"),
    FieldSpec::text("description"),
    FieldSpec::text("foot"),
    FieldSpec::incline("incline"),
    FieldSpec::float("length"),
];
const PEDESTRIAN_ONLY: &[FieldSpec] = &[FieldSpec::fixed("foot", "yes")];
const FOOTWAY_FIELDS: &[FieldSpec] = &[FieldSpec::text("footway")];
const CROSSING_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("footway"),
    FieldSpec::text("crossing"),
    FieldSpec::enumerated("crossing:markings", CROSSING_MARKINGS),
];
const STAIRS_FIELDS: &[FieldSpec] = &[
    FieldSpec::integer("step_count"),
    FieldSpec::enumerated("climb", CLIMB),
];
const AREA_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("highway"),
    FieldSpec::fixed("area", "yes"),
    FieldSpec::text("name"),
    FieldSpec::text("description"),
    FieldSpec::enumerated("surface", SURFACES),
];
const POLYGON_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("building"),
    FieldSpec::text("name"),
    FieldSpec::text("description"),
    FieldSpec::float("height"),
];
const LINE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("barrier"),
    FieldSpec::text("name"),
    FieldSpec::text("description"),
    FieldSpec::float("height"),
];
const KERB_FIELDS: &[FieldSpec] = &[
    FieldSpec::enumerated("kerb", KERBS),
    FieldSpec::fixed("barrier", "kerb"),
    FieldSpec::enumerated("tactile_paving", TACTILE_PAVING),
];
const POWER_POLE_FIELDS: &[FieldSpec] = &[FieldSpec::text("power")];
const TREE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("natural"),
    FieldSpec::enumerated("leaf_type", LEAF_TYPES),
    FieldSpec::text("species"),
    FieldSpec::float("height"),
];
const FIRE_HYDRANT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("emergency"),
    FieldSpec::enumerated("fire_hydrant:type", HYDRANT_TYPES),
];
const GENERIC_POINT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("amenity"),
    FieldSpec::text("highway"),
    FieldSpec::text("barrier"),
    FieldSpec::text("man_made"),
    FieldSpec::text("name"),
    FieldSpec::text("description"),
];

/// way subtypes in priority order, first match wins
pub const WAY_RULES: &[SubtypeRule] = &[
    SubtypeRule {
        subtype: OswSubtype::Sidewalk,
        predicate: is_sidewalk,
        field_groups: &[EDGE_FIELDS, FOOTWAY_FIELDS, PEDESTRIAN_ONLY],
    },
    SubtypeRule {
        subtype: OswSubtype::Crossing,
        predicate: is_crossing,
        field_groups: &[EDGE_FIELDS, CROSSING_FIELDS, PEDESTRIAN_ONLY],
    },
    SubtypeRule {
        subtype: OswSubtype::TrafficIsland,
        predicate: is_traffic_island,
        field_groups: &[EDGE_FIELDS, FOOTWAY_FIELDS, PEDESTRIAN_ONLY],
    },
    SubtypeRule {
        subtype: OswSubtype::Footway,
        predicate: is_footway,
        field_groups: &[EDGE_FIELDS, FOOTWAY_FIELDS, PEDESTRIAN_ONLY],
    },
    SubtypeRule {
        subtype: OswSubtype::Stairs,
        predicate: is_stairs,
        field_groups: &[EDGE_FIELDS, STAIRS_FIELDS, PEDESTRIAN_ONLY],
    },
    SubtypeRule {
        subtype: OswSubtype::PedestrianArea,
        predicate: is_pedestrian_area,
        field_groups: &[AREA_FIELDS],
    },
    SubtypeRule {
        subtype: OswSubtype::Pedestrian,
        predicate: is_pedestrian,
        field_groups: &[EDGE_FIELDS],
    },
    SubtypeRule {
        subtype: OswSubtype::LivingStreet,
        predicate: is_living_street,
        field_groups: &[EDGE_FIELDS],
    },
    SubtypeRule {
        subtype: OswSubtype::GenericZone,
        predicate: is_generic_zone,
        field_groups: &[AREA_FIELDS],
    },
    SubtypeRule {
        subtype: OswSubtype::GenericPolygon,
        predicate: is_generic_polygon,
        field_groups: &[POLYGON_FIELDS],
    },
    SubtypeRule {
        subtype: OswSubtype::GenericLine,
        predicate: is_generic_line,
        field_groups: &[LINE_FIELDS],
    },
];

pub const NODE_RULES: &[SubtypeRule] = &[SubtypeRule {
    subtype: OswSubtype::Kerb,
    predicate: is_kerb,
    field_groups: &[KERB_FIELDS],
}];

pub const POINT_RULES: &[SubtypeRule] = &[
    SubtypeRule {
        subtype: OswSubtype::PowerPole,
        predicate: is_power_pole,
        field_groups: &[POWER_POLE_FIELDS],
    },
    SubtypeRule {
        subtype: OswSubtype::FireHydrant,
        predicate: is_fire_hydrant,
        field_groups: &[FIRE_HYDRANT_FIELDS],
    },
    SubtypeRule {
        subtype: OswSubtype::Tree,
        predicate: is_tree,
        field_groups: &[TREE_FIELDS],
    },
    SubtypeRule {
        subtype: OswSubtype::GenericPoint,
        predicate: is_generic_point,
        field_groups: &[GENERIC_POINT_FIELDS],
    },
];

pub fn rules_for(category: &EntityCategory) -> &'static [SubtypeRule] {
    match category {
        EntityCategory::Way { .. } => WAY_RULES,
        EntityCategory::Node => NODE_RULES,
        EntityCategory::Point => POINT_RULES,
    }
}

fn text<'a>(tags: &'a TagSet, key: &str) -> Option<&'a str> {
    tags.get(key).and_then(|v| v.as_text()).map(|s| s.trim())
}

fn tag_is(tags: &TagSet, key: &str, value: &str) -> bool {
    text(tags, key) == Some(value)
}

fn tag_in(tags: &TagSet, key: &str, values: &[&str]) -> bool {
    text(tags, key).map(|v| values.contains(&v)).unwrap_or(false)
}

fn is_closed(category: &EntityCategory) -> bool {
    matches!(category, EntityCategory::Way { closed: true })
}

fn is_sidewalk(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "highway", "footway") && tag_is(tags, "footway", "sidewalk")
}

fn is_crossing(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "highway", "footway") && tag_is(tags, "footway", "crossing")
}

fn is_traffic_island(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "highway", "footway") && tag_is(tags, "footway", "traffic_island")
}

fn is_footway(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "highway", "footway")
}

fn is_stairs(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "highway", "steps")
}

fn is_pedestrian_area(tags: &TagSet, category: &EntityCategory) -> bool {
    is_closed(category) && tag_is(tags, "highway", "pedestrian") && tag_is(tags, "area", "yes")
}

fn is_pedestrian(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "highway", "pedestrian")
}

fn is_living_street(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "highway", "living_street")
}

fn is_generic_zone(tags: &TagSet, category: &EntityCategory) -> bool {
    is_closed(category) && text(tags, "highway").is_some() && tag_is(tags, "area", "yes")
}

fn is_generic_polygon(tags: &TagSet, category: &EntityCategory) -> bool {
    is_closed(category) && text(tags, "building").map(|b| b != "no").unwrap_or(false)
}

fn is_generic_line(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_in(tags, "barrier", LINE_BARRIERS)
}

fn is_kerb(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_in(tags, "kerb", KERBS)
}

fn is_power_pole(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "power", "pole")
}

fn is_fire_hydrant(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "emergency", "fire_hydrant")
}

fn is_tree(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_is(tags, "natural", "tree")
}

fn is_generic_point(tags: &TagSet, _: &EntityCategory) -> bool {
    tag_in(tags, "amenity", POINT_AMENITIES)
        || tag_is(tags, "highway", "street_lamp")
        || tag_is(tags, "barrier", "bollard")
        || tag_is(tags, "man_made", "manhole")
}
