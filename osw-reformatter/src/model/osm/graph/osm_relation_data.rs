use super::{OsmEntityKind, OsmRelationId};
use crate::model::osw::TagSet;

#[derive(Debug, Clone, PartialEq)]
pub struct OsmRelationMember {
    pub kind: OsmEntityKind,
    pub reference: i64,
    pub role: String,
}

impl OsmRelationMember {
    pub fn new(kind: OsmEntityKind, reference: i64, role: &str) -> OsmRelationMember {
        OsmRelationMember {
            kind,
            reference,
            role: String::from(role),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct OsmRelationData {
    pub osmid: OsmRelationId,
    pub members: Vec<OsmRelationMember>,
    pub tags: TagSet,
    pub version: Option<u32>,
    pub visible: Option<bool>,
}

impl OsmRelationData {
    pub fn new(osmid: OsmRelationId, members: Vec<OsmRelationMember>) -> OsmRelationData {
        OsmRelationData {
            osmid,
            members,
            ..Default::default()
        }
    }
}

impl From<&osmpbf::elements::Relation<'_>> for OsmRelationData {
    fn from(relation: &osmpbf::elements::Relation) -> Self {
        let members = relation
            .members()
            .map(|m| {
                let kind = match m.member_type {
                    osmpbf::elements::RelMemberType::Node => OsmEntityKind::Node,
                    osmpbf::elements::RelMemberType::Way => OsmEntityKind::Way,
                    osmpbf::elements::RelMemberType::Relation => OsmEntityKind::Relation,
                };
                let role = m.role().unwrap_or_default();
                OsmRelationMember::new(kind, m.member_id, role)
            })
            .collect();
        let tags = relation
            .tags()
            .map(|(k, v)| (String::from(k), v.into()))
            .collect();
        OsmRelationData {
            tags,
            ..OsmRelationData::new(OsmRelationId(relation.id()), members)
        }
    }
}
