// src/crowd/formation.rs
use glam::Vec3;

// Axial neighbour steps, walked in order around a ring.
const HEX_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

// Centre first, then ring 1 (6 slots), ring 2 (12 slots) on the XZ plane.
// Slot i does not depend on count.
pub fn hexagon_positions(count: usize, spacing: f32) -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(count);
    if count == 0 {
        return positions;
    }

    positions.push(Vec3::ZERO);
    let mut ring = 1;
    while positions.len() < count {
        let (dq, dr) = HEX_DIRECTIONS[4];
        let mut q = dq * ring;
        let mut r = dr * ring;

        'ring: for (step_q, step_r) in HEX_DIRECTIONS {
            for _ in 0..ring {
                if positions.len() == count {
                    break 'ring;
                }
                positions.push(axial_to_local(q, r, spacing));
                q += step_q;
                r += step_r;
            }
        }
        ring += 1;
    }

    positions
}

fn axial_to_local(q: i32, r: i32, spacing: f32) -> Vec3 {
    let x = spacing * (q as f32 + r as f32 * 0.5);
    let z = spacing * (r as f32 * 3f32.sqrt() * 0.5);
    Vec3::new(x, 0.0, z)
}
