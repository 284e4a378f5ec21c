//! Model assembly
//!
//! Merges directly translated cubes with the join edges resolved from
//! explores into the final ordered cube list.

use std::collections::HashMap;
use lkml2cube_core::{Cube, IntermediateModel, TranslateError};
use crate::explores::ResolvedExplore;
use crate::views::translate_view;

/// Assemble the final cube list
///
/// - Edges are attached to their owner cube in explore order, then rule
///   order. Edges from different explores on the same pair are all kept.
/// - A view reached by an explore without a cube in `cubes` gets one
///   translated on demand; these stubs follow the direct cubes, in the
///   order their explores were declared.
/// - A cube appears once, however many explores reach it.
/// - Every cube must end up with a table or SQL to read from.
pub fn assemble(
    model: &IntermediateModel,
    cubes: Vec<Cube>,
    explores: &[ResolvedExplore],
) -> Result<Vec<Cube>, TranslateError> {
    let mut ordered: Vec<Cube> = Vec::with_capacity(cubes.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for cube in cubes {
        if positions.contains_key(&cube.name) {
            continue;
        }
        positions.insert(cube.name.clone(), ordered.len());
        ordered.push(cube);
    }

    for resolved in explores {
        for view_name in &resolved.views {
            if positions.contains_key(view_name) {
                continue;
            }

            let view = model.view(view_name, &format!("explore '{}'", resolved.explore))?;
            let stub = translate_view(view)?;

            tracing::debug!(
                cube = %stub.name,
                explore = %resolved.explore,
                "Synthesized cube reachable only through explore"
            );

            positions.insert(stub.name.clone(), ordered.len());
            ordered.push(stub);
        }

        for edge in &resolved.edges {
            let position = positions.get(&edge.owner).copied().ok_or_else(|| {
                TranslateError::UnknownView {
                    view: edge.owner.clone(),
                    referenced_by: format!("explore '{}'", resolved.explore),
                }
            })?;
            ordered[position].joins.push(edge.to_cube_join());
        }
    }

    if let Some(cube) = ordered.iter().find(|c| !c.has_source()) {
        return Err(TranslateError::MissingSourceSql { cube: cube.name.clone() });
    }

    for cube in ordered.iter().filter(|c| !c.joins.is_empty()) {
        tracing::debug!(cube = %cube.name, joins = ?cube.join_targets(), "Attached joins");
    }

    Ok(ordered)
}
