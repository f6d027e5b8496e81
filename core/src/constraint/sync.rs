//! Pull (entity → node) and push (node → entity) for every curve kind.
//!
//! Pull reads the dependency's entity inside a read scope, moves its geometry
//! from the entity frame through world space into plane space and stores it.
//! Push does the reverse inside a write scope. Neither keeps the entity open
//! beyond the call; the dependency is resolved again every time.

use super::geometry::NodeKind;
use crate::document::{DependencyId, DocumentModel, Entity, PolylineEntity};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{
    arc_to_bulge, bulge_to_arc, world_to_ocs, CircArc3, EllipArc3, Line3, LineSeg3, Matrix4, NurbsCurve3, Point3,
    Ray3, EPSILON,
};
use crate::persist::{resolve_segment, PersSubentId, SegmentResolution};
use tracing::debug;

/// What a pull or push touched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SyncOutcome {
    /// Set when the dependency is a polyline segment.
    pub segment: Option<SegmentResolution>,
}

impl SyncOutcome {
    pub fn is_polyline(&self) -> bool {
        self.segment.is_some()
    }
}

/// Source geometry in world space, except polyline segments which stay in
/// their OCS until the node kind decides how to read them.
enum Source {
    Segment(LineSeg3),
    Ray(Ray3),
    XLine(Line3),
    Circle(CircArc3),
    Arc(CircArc3),
    Ellipse(EllipArc3),
    Spline(NurbsCurve3),
    PolylineSegment {
        start: Point3,
        end: Point3,
        bulge: f64,
        ocs_to_world: Matrix4,
    },
}

impl Source {
    fn name(&self) -> &'static str {
        match self {
            Source::Segment(_) => "line",
            Source::Ray(_) => "ray",
            Source::XLine(_) => "construction line",
            Source::Circle(_) => "circle",
            Source::Arc(_) => "arc",
            Source::Ellipse(_) => "ellipse",
            Source::Spline(_) => "spline",
            Source::PolylineSegment { .. } => "polyline segment",
        }
    }
}

fn polyline_segment(
    polyline: &PolylineEntity,
    subent: Option<&PersSubentId>,
) -> AssocResult<SegmentResolution> {
    match subent {
        Some(PersSubentId::Edge(edge)) => resolve_segment(polyline, edge),
        Some(other) => Err(AssocError::bad_obj_type(format!("{:?} does not name a polyline segment", other))),
        None => Err(AssocError::bad_obj_type("polyline dependency without a segment reference")),
    }
}

fn read_source(entity: &Entity, subent: Option<&PersSubentId>) -> AssocResult<(Source, Option<SegmentResolution>)> {
    let source = match entity {
        Entity::Line(l) => Source::Segment(LineSeg3::new(l.start, l.end)),
        Entity::Ray(r) => Source::Ray(Ray3::new(r.base_point, r.direction)),
        Entity::XLine(x) => Source::XLine(Line3::new(x.base_point, x.direction)),
        Entity::Circle(c) => Source::Circle(c.to_circ_arc()),
        Entity::Arc(a) => Source::Arc(a.to_circ_arc()),
        Entity::Ellipse(e) => Source::Ellipse(e.to_ellip_arc()),
        Entity::Spline(s) => Source::Spline(s.curve.clone()),
        Entity::Polyline(pl) => {
            let resolved = polyline_segment(pl, subent)?;
            let missing = || AssocError::bad_obj_type("resolved polyline vertex out of range");
            let source = Source::PolylineSegment {
                start: pl.point_ocs(resolved.start).ok_or_else(missing)?,
                end: pl.point_ocs(resolved.end).ok_or_else(missing)?,
                bulge: pl.vertices[resolved.start].bulge,
                ocs_to_world: pl.ocs_to_world(),
            };
            return Ok((source, Some(resolved)));
        }
        Entity::Solid(_) => {
            return Err(AssocError::bad_obj_type("solids cannot back constrained geometry"));
        }
    };
    Ok((source, None))
}

fn mismatch(kind: &str, source: &Source) -> AssocError {
    AssocError::bad_obj_type(format!("cannot take a {} node from a {}", kind, source.name()))
}

fn is_straight(bulge: f64) -> bool {
    bulge.abs() < 1e-12
}

/// Store `source` in `kind`, moved into plane space.
fn apply_source(kind: &mut NodeKind, source: Source, to_plane: &Matrix4) -> AssocResult<()> {
    let kind_name = kind.name();
    // Straight polyline segments read like lines; an arc node hits the
    // degenerate bulge below instead.
    let wants_arc = matches!(kind, NodeKind::Arc(_));
    let source = match source {
        Source::PolylineSegment { start, end, bulge, ocs_to_world } if is_straight(bulge) && !wants_arc => {
            let mut seg = LineSeg3::new(start, end);
            seg.transform_by(&ocs_to_world);
            Source::Segment(seg)
        }
        other => other,
    };

    match (kind, &source) {
        (NodeKind::Line(n), Source::Segment(seg)) => {
            let mut line = seg.to_line();
            line.transform_by(to_plane);
            n.line.replace(line);
        }
        (NodeKind::Line(n), Source::Ray(ray)) => {
            let mut line = Line3::new(ray.origin, ray.direction);
            line.transform_by(to_plane);
            n.line.replace(line);
        }
        (NodeKind::Line(n), Source::XLine(xline)) => {
            let mut line = *xline;
            line.transform_by(to_plane);
            n.line.replace(line);
        }
        (NodeKind::ConstructionLine(n), Source::XLine(xline)) => {
            let mut line = *xline;
            line.transform_by(to_plane);
            n.line.replace(line);
        }
        (NodeKind::BoundedLine(n), Source::Segment(seg)) => {
            let mut seg = *seg;
            seg.transform_by(to_plane);
            n.seg.replace(seg);
            n.is_ray = false;
        }
        (NodeKind::BoundedLine(n), Source::Ray(ray)) => {
            let mut seg = LineSeg3::new(ray.origin, ray.origin + ray.direction);
            seg.transform_by(to_plane);
            n.seg.replace(seg);
            n.is_ray = true;
        }
        (NodeKind::Circle(n), Source::Circle(arc)) => {
            let mut arc = *arc;
            arc.transform_by(to_plane);
            n.arc.replace(arc);
        }
        (NodeKind::Arc(n), Source::Arc(arc)) => {
            let mut arc = *arc;
            arc.transform_by(to_plane);
            n.arc.replace(arc);
        }
        (NodeKind::Arc(n), Source::PolylineSegment { start, end, bulge, ocs_to_world }) => {
            let mut arc = bulge_to_arc(start, end, *bulge)?;
            arc.transform_by(ocs_to_world);
            arc.transform_by(to_plane);
            n.arc.replace(arc);
        }
        (NodeKind::Ellipse(n), Source::Ellipse(arc)) if arc.is_closed() => {
            let mut arc = *arc;
            arc.transform_by(to_plane);
            n.arc.replace(arc);
        }
        (NodeKind::BoundedEllipse(n), Source::Ellipse(arc)) => {
            let mut arc = *arc;
            arc.transform_by(to_plane);
            n.arc.replace(arc);
        }
        (NodeKind::Spline(n), Source::Spline(curve)) => {
            let mut curve = curve.clone();
            curve.transform_by(to_plane);
            n.pull_curve(curve)?;
        }
        _ => return Err(mismatch(kind_name, &source)),
    }
    Ok(())
}

/// Read the dependency's geometry into `kind`. The original snapshot is
/// captured before anything is overwritten.
pub fn pull<D: DocumentModel>(
    kind: &mut NodeKind,
    doc: &D,
    dependency: DependencyId,
    world_to_plane: &Matrix4,
) -> AssocResult<SyncOutcome> {
    let info = doc.dependency(dependency)?;
    let (source, segment) = doc.with_entity(info.entity, |e| read_source(e, info.subent.as_ref()))?;
    debug!("pull {} node from {} via {}", kind.name(), source.name(), dependency);
    apply_source(kind, source, world_to_plane)?;
    Ok(SyncOutcome { segment })
}

// =============================================================================
// Push
// =============================================================================

fn project_onto(line: &Line3, p: &Point3) -> Point3 {
    line.project_point(p)
}

fn write_polyline(
    kind: &NodeKind,
    pl: &mut PolylineEntity,
    resolved: &SegmentResolution,
    to_world: &Matrix4,
) -> AssocResult<()> {
    let (s, e) = (resolved.start, resolved.end);
    let ocs_to_world = pl.ocs_to_world();
    let to_ocs = world_to_ocs(&pl.normal, pl.elevation);
    let missing = || AssocError::bad_obj_type("resolved polyline vertex out of range");
    let old_bulge = pl.vertices.get(s).ok_or_else(missing)?.bulge;

    let (start, end, bulge) = match kind {
        NodeKind::Line(n) if is_straight(old_bulge) => {
            let mut line = *n.line.current();
            line.transform_by(to_world);
            let start = ocs_to_world.transform_point(&pl.point_ocs(s).ok_or_else(missing)?);
            let end = ocs_to_world.transform_point(&pl.point_ocs(e).ok_or_else(missing)?);
            (project_onto(&line, &start), project_onto(&line, &end), 0.0)
        }
        NodeKind::BoundedLine(n) if is_straight(old_bulge) => {
            let mut seg = *n.seg.current();
            seg.transform_by(to_world);
            (seg.start, seg.end, 0.0)
        }
        NodeKind::Arc(n) if !is_straight(old_bulge) => {
            let mut arc = *n.arc.current();
            arc.transform_by(to_world);
            (arc.start_point(), arc.end_point(), arc_to_bulge(&arc, old_bulge))
        }
        other => {
            return Err(AssocError::bad_obj_type(format!(
                "cannot write a {} node to this polyline segment",
                other.name()
            )))
        }
    };

    let start = to_ocs.transform_point(&start);
    let end = to_ocs.transform_point(&end);
    let first = pl.vertices.get_mut(s).ok_or_else(missing)?;
    first.position.x = start.x;
    first.position.y = start.y;
    first.bulge = bulge;
    let second = pl.vertices.get_mut(e).ok_or_else(missing)?;
    second.position.x = end.x;
    second.position.y = end.y;
    Ok(())
}

fn write_entity(
    kind: &NodeKind,
    entity: &mut Entity,
    subent: Option<&PersSubentId>,
    to_world: &Matrix4,
) -> AssocResult<Option<SegmentResolution>> {
    match (kind, entity) {
        (NodeKind::Line(n), Entity::Line(l)) => {
            let mut line = *n.line.current();
            line.transform_by(to_world);
            l.start = project_onto(&line, &l.start);
            l.end = project_onto(&line, &l.end);
        }
        (NodeKind::Line(n), Entity::Ray(r)) => {
            let mut line = *n.line.current();
            line.transform_by(to_world);
            r.base_point = project_onto(&line, &r.base_point);
            r.direction = line.direction;
        }
        (NodeKind::Line(n), Entity::XLine(x)) => {
            let mut line = *n.line.current();
            line.transform_by(to_world);
            x.base_point = project_onto(&line, &x.base_point);
            x.direction = line.direction;
        }
        (NodeKind::ConstructionLine(n), Entity::XLine(x)) => {
            let mut line = *n.line.current();
            line.transform_by(to_world);
            x.base_point = project_onto(&line, &x.base_point);
            x.direction = line.direction;
        }
        (NodeKind::BoundedLine(n), Entity::Line(l)) if !n.is_ray => {
            let mut seg = *n.seg.current();
            seg.transform_by(to_world);
            l.start = seg.start;
            l.end = seg.end;
        }
        (NodeKind::BoundedLine(n), Entity::Ray(r)) => {
            let mut seg = *n.seg.current();
            seg.transform_by(to_world);
            if seg.length() < EPSILON {
                return Err(AssocError::DegenerateGeometry("ray direction has zero length".into()));
            }
            r.base_point = seg.start;
            r.direction = seg.direction();
        }
        (NodeKind::Circle(n), Entity::Circle(c)) => {
            let mut arc = *n.arc.current();
            arc.transform_by(to_world);
            c.center = arc.center;
            c.normal = arc.normal;
            c.radius = arc.radius;
        }
        (NodeKind::Arc(n), Entity::Arc(a)) => {
            let mut arc = *n.arc.current();
            arc.transform_by(to_world);
            a.set_from_circ_arc(&arc);
        }
        (NodeKind::Ellipse(n), Entity::Ellipse(e)) => {
            let mut arc = *n.arc.current();
            arc.transform_by(to_world);
            e.set_from_ellip_arc(&arc);
        }
        (NodeKind::BoundedEllipse(n), Entity::Ellipse(e)) => {
            let mut arc = *n.arc.current();
            arc.transform_by(to_world);
            e.set_from_ellip_arc(&arc);
        }
        (NodeKind::Spline(n), Entity::Spline(s)) => {
            let mut curve = n.nurbs.current().clone();
            curve.transform_by(to_world);
            s.curve = curve;
        }
        (NodeKind::Line(_) | NodeKind::BoundedLine(_) | NodeKind::Arc(_), Entity::Polyline(pl)) => {
            let resolved = polyline_segment(pl, subent)?;
            write_polyline(kind, pl, &resolved, to_world)?;
            return Ok(Some(resolved));
        }
        (_, entity) => {
            return Err(AssocError::bad_obj_type(format!(
                "cannot write a {} node to a {}",
                kind.name(),
                entity.kind_name()
            )))
        }
    }
    Ok(None)
}

/// Write the node's geometry back to its dependency, moved out of plane space.
pub fn push<D: DocumentModel>(
    kind: &NodeKind,
    doc: &mut D,
    dependency: DependencyId,
    plane_to_world: &Matrix4,
) -> AssocResult<SyncOutcome> {
    let info = doc.dependency(dependency)?;
    debug!("push {} node to {}", kind.name(), dependency);
    let segment = doc.with_entity_mut(info.entity, |e| write_entity(kind, e, info.subent.as_ref(), plane_to_world))?;
    Ok(SyncOutcome { segment })
}
