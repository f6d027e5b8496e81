//! Field layouts of constrained-geometry nodes, constraint groups and
//! persistent edge identities.
//!
//! Node prefix: kind tag, group id, dependency id (`0` when unbound). The
//! kind-specific fields follow; the original snapshot and the dirty flag are
//! session state and never filed.

use super::dxf_code::{BOOL, ID, KIND, LENGTH, POINT, REAL, VECTOR};
use super::fields::{Dwg, Dxf, FieldIn, FieldOut};
use super::{DwgFiler, DxfFiler};
use crate::config::Tolerance;
use crate::constraint::{
    ArcNode, BoundedEllipseNode, BoundedLineNode, CircleNode, ConstrainedGeometry, ConstraintGroup,
    ConstructionLineNode, ConstructionVariant, EllipseNode, ImplicitPointKind, ImplicitPointNode, LineNode,
    NodeBase, NodeId, NodeKind, RigidSetNode, SplineNode, Tracked,
};
use crate::document::{DependencyId, GroupId};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{CircArc3, EllipArc3, KnotVector, Line3, LineSeg3, Matrix4, Point3};
use crate::persist::{EdgeIdentity, SubentType};
use tracing::debug;

/// Grow length written with every array. Readers ignore it.
pub const ARRAY_GROW_LENGTH: i32 = 8;

const TAG_IMPLICIT_POINT: i32 = 1;
const TAG_LINE: i32 = 2;
const TAG_BOUNDED_LINE: i32 = 3;
const TAG_CONSTRUCTION_LINE: i32 = 4;
const TAG_CIRCLE: i32 = 5;
const TAG_ARC: i32 = 6;
const TAG_ELLIPSE: i32 = 7;
const TAG_BOUNDED_ELLIPSE: i32 = 8;
const TAG_SPLINE: i32 = 9;
const TAG_RIGID_SET: i32 = 10;

const VARIANT_TWO_POINT: i32 = 0;
const VARIANT_DATUM: i32 = 1;

fn kind_tag(kind: &NodeKind) -> i32 {
    match kind {
        NodeKind::ImplicitPoint(_) => TAG_IMPLICIT_POINT,
        NodeKind::Line(_) => TAG_LINE,
        NodeKind::BoundedLine(_) => TAG_BOUNDED_LINE,
        NodeKind::ConstructionLine(_) => TAG_CONSTRUCTION_LINE,
        NodeKind::Circle(_) => TAG_CIRCLE,
        NodeKind::Arc(_) => TAG_ARC,
        NodeKind::Ellipse(_) => TAG_ELLIPSE,
        NodeKind::BoundedEllipse(_) => TAG_BOUNDED_ELLIPSE,
        NodeKind::Spline(_) => TAG_SPLINE,
        NodeKind::RigidSet(_) => TAG_RIGID_SET,
    }
}

fn to_wire_id(value: u32) -> i32 {
    // Ids are handed out sequentially from 1 and never reach i32::MAX.
    value as i32
}

fn from_wire_id(value: i32, what: &str) -> AssocResult<u32> {
    u32::try_from(value).map_err(|_| AssocError::invalid_input(format!("negative {} {}", what, value)))
}

fn read_node_id<R: FieldIn>(r: &mut R) -> AssocResult<NodeId> {
    Ok(NodeId(from_wire_id(r.take_i32(ID)?, "node id")?))
}

fn read_len<R: FieldIn>(r: &mut R) -> AssocResult<usize> {
    let len = r.take_i32(LENGTH)?;
    usize::try_from(len).map_err(|_| AssocError::invalid_input(format!("negative array length {}", len)))
}

// =============================================================================
// Arrays
// =============================================================================

/// `(logical length, physical length, grow length, elements)`.
fn write_array<W: FieldOut, T>(w: &mut W, items: &[T], mut put: impl FnMut(&mut W, &T)) {
    let len = items.len() as i32;
    w.put_i32(LENGTH, len);
    w.put_i32(LENGTH, len);
    w.put_i32(LENGTH, ARRAY_GROW_LENGTH);
    for item in items {
        put(w, item);
    }
}

fn read_array<R: FieldIn, T>(r: &mut R, mut take: impl FnMut(&mut R) -> AssocResult<T>) -> AssocResult<Vec<T>> {
    let logical = read_len(r)?;
    let physical = read_len(r)?;
    let _grow = r.take_i32(LENGTH)?;
    if physical < logical {
        return Err(AssocError::invalid_input(format!(
            "array physical length {} below logical length {}",
            physical, logical
        )));
    }
    (0..logical).map(|_| take(r)).collect()
}

// =============================================================================
// Geometry records
// =============================================================================

fn write_line<W: FieldOut>(w: &mut W, line: &Line3) {
    w.put_point(POINT, &line.origin);
    w.put_vector(VECTOR, &line.direction);
}

fn read_line<R: FieldIn>(r: &mut R) -> AssocResult<Line3> {
    Ok(Line3 {
        origin: r.take_point(POINT)?,
        direction: r.take_vector(VECTOR)?,
    })
}

fn write_circ_arc<W: FieldOut>(w: &mut W, arc: &CircArc3) {
    w.put_point(POINT, &arc.center);
    w.put_vector(VECTOR, &arc.normal);
    w.put_vector(VECTOR, &arc.ref_vec);
    w.put_f64(REAL, arc.radius);
    w.put_f64(REAL, arc.start_angle);
    w.put_f64(REAL, arc.end_angle);
}

fn read_circ_arc<R: FieldIn>(r: &mut R) -> AssocResult<CircArc3> {
    Ok(CircArc3 {
        center: r.take_point(POINT)?,
        normal: r.take_vector(VECTOR)?,
        ref_vec: r.take_vector(VECTOR)?,
        radius: r.take_f64(REAL)?,
        start_angle: r.take_f64(REAL)?,
        end_angle: r.take_f64(REAL)?,
    })
}

fn write_ellip_arc<W: FieldOut>(w: &mut W, arc: &EllipArc3) {
    w.put_point(POINT, &arc.center);
    w.put_vector(VECTOR, &arc.normal);
    w.put_vector(VECTOR, &arc.major_axis);
    w.put_f64(REAL, arc.major_radius);
    w.put_f64(REAL, arc.minor_radius);
    w.put_f64(REAL, arc.start_angle);
    w.put_f64(REAL, arc.end_angle);
}

fn read_ellip_arc<R: FieldIn>(r: &mut R) -> AssocResult<EllipArc3> {
    Ok(EllipArc3 {
        center: r.take_point(POINT)?,
        normal: r.take_vector(VECTOR)?,
        major_axis: r.take_vector(VECTOR)?,
        major_radius: r.take_f64(REAL)?,
        minor_radius: r.take_f64(REAL)?,
        start_angle: r.take_f64(REAL)?,
        end_angle: r.take_f64(REAL)?,
    })
}

// =============================================================================
// Nodes
// =============================================================================

fn write_spline<W: FieldOut>(w: &mut W, spline: &SplineNode) {
    w.put_i32(ID, spline.degree as i32);
    w.put_bool(BOOL, spline.periodic);
    write_array(w, &spline.knots.knots, |w, k| w.put_f64(REAL, *k));
    w.put_f64(REAL, spline.knots.tolerance);
    write_array(w, &spline.weights, |w, x| w.put_f64(REAL, *x));
    write_array(w, &spline.control_points, |w, p| w.put_point(POINT, p));
    w.put_bool(BOOL, spline.wrap_point);
    w.put_i32(LENGTH, spline.define_ids.len() as i32);
    for id in &spline.define_ids {
        w.put_i32(ID, to_wire_id(id.0));
    }
}

fn read_spline<R: FieldIn>(r: &mut R) -> AssocResult<SplineNode> {
    let degree = r.take_i32(ID)?;
    let degree = u32::try_from(degree).map_err(|_| AssocError::invalid_input(format!("spline degree {}", degree)))?;
    let periodic = r.take_bool(BOOL)?;
    let knots = read_array(r, |r| r.take_f64(REAL))?;
    let tolerance = r.take_f64(REAL)?;
    let weights = read_array(r, |r| r.take_f64(REAL))?;
    let control_points = read_array(r, |r| r.take_point(POINT))?;
    let wrap_point = r.take_bool(BOOL)?;
    let define_count = read_len(r)?;
    let define_ids = (0..define_count).map(|_| read_node_id(r)).collect::<AssocResult<Vec<_>>>()?;

    let mut spline = SplineNode {
        degree,
        knots: KnotVector::with_tolerance(knots, tolerance),
        weights,
        control_points,
        periodic,
        wrap_point,
        define_ids,
        ..SplineNode::default()
    };
    spline.rebuild_curve();
    spline.nurbs.commit();
    Ok(spline)
}

fn write_kind<W: FieldOut>(w: &mut W, kind: &NodeKind) {
    match kind {
        NodeKind::ImplicitPoint(p) => {
            w.put_i32(KIND, p.kind.tag());
            w.put_i32(ID, p.kind.define_index());
            w.put_i32(ID, to_wire_id(p.curve.0));
        }
        NodeKind::Line(n) => write_line(w, n.line.current()),
        NodeKind::BoundedLine(n) => {
            let seg = n.seg.current();
            w.put_bool(BOOL, n.is_ray);
            w.put_point(POINT, &seg.start);
            w.put_point(POINT, &seg.end);
        }
        NodeKind::ConstructionLine(n) => {
            match n.variant {
                ConstructionVariant::TwoPoint { points } => {
                    w.put_i32(KIND, VARIANT_TWO_POINT);
                    w.put_i32(ID, to_wire_id(points[0].0));
                    w.put_i32(ID, to_wire_id(points[1].0));
                }
                ConstructionVariant::Datum { point, direction } => {
                    w.put_i32(KIND, VARIANT_DATUM);
                    w.put_i32(ID, to_wire_id(point.0));
                    w.put_vector(VECTOR, &direction);
                }
            }
            write_line(w, n.line.current());
        }
        NodeKind::Circle(n) => write_circ_arc(w, n.arc.current()),
        NodeKind::Arc(n) => write_circ_arc(w, n.arc.current()),
        NodeKind::Ellipse(n) => write_ellip_arc(w, n.arc.current()),
        NodeKind::BoundedEllipse(n) => write_ellip_arc(w, n.arc.current()),
        NodeKind::Spline(n) => write_spline(w, n),
        NodeKind::RigidSet(n) => {
            w.put_i32(LENGTH, n.members.len() as i32);
            for member in &n.members {
                w.put_i32(ID, to_wire_id(member.0));
            }
            for x in n.transform.iter() {
                w.put_f64(REAL, *x);
            }
        }
    }
}

fn read_kind<R: FieldIn>(r: &mut R, tag: i32) -> AssocResult<NodeKind> {
    Ok(match tag {
        TAG_IMPLICIT_POINT => {
            let kind_tag = r.take_i32(KIND)?;
            let define_index = r.take_i32(ID)?;
            let kind = ImplicitPointKind::from_parts(kind_tag, define_index)?;
            NodeKind::ImplicitPoint(ImplicitPointNode::new(kind, read_node_id(r)?))
        }
        TAG_LINE => NodeKind::Line(LineNode::new(read_line(r)?)),
        TAG_BOUNDED_LINE => {
            let is_ray = r.take_bool(BOOL)?;
            let seg = LineSeg3::new(r.take_point(POINT)?, r.take_point(POINT)?);
            NodeKind::BoundedLine(BoundedLineNode {
                seg: Tracked::new(seg),
                is_ray,
            })
        }
        TAG_CONSTRUCTION_LINE => {
            let variant = match r.take_i32(KIND)? {
                VARIANT_TWO_POINT => ConstructionVariant::TwoPoint {
                    points: [read_node_id(r)?, read_node_id(r)?],
                },
                VARIANT_DATUM => ConstructionVariant::Datum {
                    point: read_node_id(r)?,
                    direction: r.take_vector(VECTOR)?,
                },
                other => return Err(AssocError::bad_obj_type(format!("unknown construction line variant {}", other))),
            };
            NodeKind::ConstructionLine(ConstructionLineNode {
                line: Tracked::new(read_line(r)?),
                variant,
            })
        }
        TAG_CIRCLE => NodeKind::Circle(CircleNode {
            arc: Tracked::new(read_circ_arc(r)?),
        }),
        TAG_ARC => NodeKind::Arc(ArcNode {
            arc: Tracked::new(read_circ_arc(r)?),
        }),
        TAG_ELLIPSE => NodeKind::Ellipse(EllipseNode {
            arc: Tracked::new(read_ellip_arc(r)?),
        }),
        TAG_BOUNDED_ELLIPSE => NodeKind::BoundedEllipse(BoundedEllipseNode {
            arc: Tracked::new(read_ellip_arc(r)?),
        }),
        TAG_SPLINE => NodeKind::Spline(read_spline(r)?),
        TAG_RIGID_SET => {
            let count = read_len(r)?;
            let members = (0..count).map(|_| read_node_id(r)).collect::<AssocResult<Vec<_>>>()?;
            let mut values = [0.0; 16];
            for x in values.iter_mut() {
                *x = r.take_f64(REAL)?;
            }
            let mut set = RigidSetNode::new(members);
            set.set_transform(Matrix4::from_column_slice(&values));
            NodeKind::RigidSet(set)
        }
        other => return Err(AssocError::bad_obj_type(format!("unknown node kind tag {}", other))),
    })
}

fn write_node<W: FieldOut>(w: &mut W, node: &ConstrainedGeometry) {
    w.put_i32(KIND, kind_tag(&node.kind));
    w.put_i32(ID, to_wire_id(node.base.group.0));
    w.put_i32(ID, node.base.dependency.map_or(0, |d| to_wire_id(d.0)));
    write_kind(w, &node.kind);
}

fn read_node<R: FieldIn>(r: &mut R, id: NodeId) -> AssocResult<ConstrainedGeometry> {
    let tag = r.take_i32(KIND)?;
    let group = GroupId(from_wire_id(r.take_i32(ID)?, "group id")?);
    let dependency = match from_wire_id(r.take_i32(ID)?, "dependency id")? {
        0 => None,
        d => Some(DependencyId(d)),
    };
    let mut base = NodeBase::new(id, group);
    base.dependency = dependency;
    Ok(ConstrainedGeometry::new(base, read_kind(r, tag)?))
}

impl ConstrainedGeometry {
    pub fn dwg_out_fields<F: DwgFiler + ?Sized>(&self, filer: &mut F) {
        write_node(&mut Dwg(filer), self);
    }

    /// Read a node filed by [`dwg_out_fields`](Self::dwg_out_fields). The
    /// node id is not part of the node's fields; the caller supplies it.
    pub fn dwg_in_fields<F: DwgFiler + ?Sized>(filer: &mut F, id: NodeId) -> AssocResult<Self> {
        read_node(&mut Dwg(filer), id)
    }

    pub fn dxf_out_fields<F: DxfFiler + ?Sized>(&self, filer: &mut F) {
        write_node(&mut Dxf(filer), self);
    }

    pub fn dxf_in_fields<F: DxfFiler + ?Sized>(filer: &mut F, id: NodeId) -> AssocResult<Self> {
        read_node(&mut Dxf(filer), id)
    }
}

// =============================================================================
// Groups
// =============================================================================

fn write_group<W: FieldOut>(w: &mut W, group: &ConstraintGroup) {
    w.put_i32(ID, to_wire_id(group.id().0));
    w.put_f64(REAL, group.tolerance().equal_point);
    w.put_f64(REAL, group.tolerance().equal_vector);
    w.put_i32(LENGTH, group.len() as i32);
    for node in group.nodes() {
        w.put_i32(ID, to_wire_id(node.base.id.0));
        write_node(w, node);
    }
}

fn read_group<R: FieldIn>(r: &mut R) -> AssocResult<ConstraintGroup> {
    let id = GroupId(from_wire_id(r.take_i32(ID)?, "group id")?);
    let tolerance = Tolerance {
        equal_point: r.take_f64(REAL)?,
        equal_vector: r.take_f64(REAL)?,
    };
    let count = read_len(r)?;
    // Counts come from the stream, so nothing is reserved up front.
    let nodes = (0..count)
        .map(|_| {
            let node_id = read_node_id(r)?;
            read_node(r, node_id)
        })
        .collect::<AssocResult<Vec<_>>>()?;
    debug!("read {} nodes of {}", nodes.len(), id);
    ConstraintGroup::from_filed(id, tolerance, nodes)
}

impl ConstraintGroup {
    /// File every node with its id, preceded by the group id and tolerance.
    pub fn dwg_out_fields<F: DwgFiler + ?Sized>(&self, filer: &mut F) {
        write_group(&mut Dwg(filer), self);
    }

    /// Read a group and check that every node reference resolves.
    pub fn dwg_in_fields<F: DwgFiler + ?Sized>(filer: &mut F) -> AssocResult<Self> {
        read_group(&mut Dwg(filer))
    }

    pub fn dxf_out_fields<F: DxfFiler + ?Sized>(&self, filer: &mut F) {
        write_group(&mut Dxf(filer), self);
    }

    pub fn dxf_in_fields<F: DxfFiler + ?Sized>(filer: &mut F) -> AssocResult<Self> {
        read_group(&mut Dxf(filer))
    }
}

// =============================================================================
// Persistent edge identities
// =============================================================================

fn subent_type_tag(kind: SubentType) -> i32 {
    match kind {
        SubentType::Null => 0,
        SubentType::Edge => 1,
        SubentType::Vertex => 2,
        SubentType::Face => 3,
    }
}

fn subent_type_from_tag(tag: i32) -> AssocResult<SubentType> {
    match tag {
        0 => Ok(SubentType::Null),
        1 => Ok(SubentType::Edge),
        2 => Ok(SubentType::Vertex),
        3 => Ok(SubentType::Face),
        other => Err(AssocError::bad_obj_type(format!("unknown subentity type {}", other))),
    }
}

fn write_edge_identity<W: FieldOut>(w: &mut W, edge: &EdgeIdentity) {
    w.put_i32(KIND, subent_type_tag(edge.kind));
    w.put_i32(ID, to_wire_id(edge.vertex_id_1));
    w.put_i32(ID, to_wire_id(edge.vertex_id_2));
    w.put_bool(BOOL, edge.midpoint_style);
}

fn read_edge_identity<R: FieldIn>(r: &mut R) -> AssocResult<EdgeIdentity> {
    Ok(EdgeIdentity {
        kind: subent_type_from_tag(r.take_i32(KIND)?)?,
        vertex_id_1: from_wire_id(r.take_i32(ID)?, "vertex id")?,
        vertex_id_2: from_wire_id(r.take_i32(ID)?, "vertex id")?,
        midpoint_style: r.take_bool(BOOL)?,
    })
}

impl EdgeIdentity {
    pub fn dwg_out_fields<F: DwgFiler + ?Sized>(&self, filer: &mut F) {
        write_edge_identity(&mut Dwg(filer), self);
    }

    pub fn dwg_in_fields<F: DwgFiler + ?Sized>(filer: &mut F) -> AssocResult<Self> {
        read_edge_identity(&mut Dwg(filer))
    }

    pub fn dxf_out_fields<F: DxfFiler + ?Sized>(&self, filer: &mut F) {
        write_edge_identity(&mut Dxf(filer), self);
    }

    pub fn dxf_in_fields<F: DxfFiler + ?Sized>(filer: &mut F) -> AssocResult<Self> {
        read_edge_identity(&mut Dxf(filer))
    }
}
