// src/level/gate.rs
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value")]
pub enum GateOp {
    Add(u32),
    Subtract(u32),
    Multiply(u32),
    Divide(u32),
}

impl GateOp {
    pub fn delta(&self, count: u32) -> i32 {
        let count = count as i64;
        let new_count = match *self {
            GateOp::Add(n) => count + n as i64,
            GateOp::Subtract(n) => count - n as i64,
            GateOp::Multiply(n) => count * n as i64,
            GateOp::Divide(0) => count,
            GateOp::Divide(n) => count / n as i64,
        };
        (new_count.max(0) - count).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    #[serde(default)]
    pub x: f32,
    pub z: f32,
    pub left: GateOp,
    pub right: GateOp,
}

impl Gate {
    pub fn new(z: f32, left: GateOp, right: GateOp) -> Self {
        Self { x: 0.0, z, left, right }
    }

    pub fn side(&self, man_pos: Vec3) -> GateOp {
        if man_pos.x < self.x {
            self.left
        } else {
            self.right
        }
    }

    pub fn catalyse(&self, man_pos: Vec3, count: u32) -> i32 {
        self.side(man_pos).delta(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_produce_signed_deltas() {
        assert_eq!(GateOp::Add(5).delta(10), 5);
        assert_eq!(GateOp::Subtract(4).delta(10), -4);
        assert_eq!(GateOp::Subtract(40).delta(10), -10);
        assert_eq!(GateOp::Multiply(3).delta(10), 20);
        assert_eq!(GateOp::Multiply(0).delta(10), -10);
        assert_eq!(GateOp::Divide(3).delta(10), -7);
        assert_eq!(GateOp::Divide(0).delta(10), 0);
    }

    #[test]
    fn side_is_chosen_by_lead_man_x() {
        let gate = Gate::new(20.0, GateOp::Add(10), GateOp::Subtract(2));
        assert_eq!(gate.catalyse(Vec3::new(-1.0, 0.0, 20.0), 5), 10);
        assert_eq!(gate.catalyse(Vec3::new(1.5, 0.0, 20.0), 5), -2);
    }

    #[test]
    fn gate_json_shape() {
        let gate: Gate = serde_json::from_str(
            r#"{ "z": 12.0, "left": { "op": "Multiply", "value": 2 }, "right": { "op": "Add", "value": 3 } }"#,
        )
        .unwrap();
        assert_eq!(gate, Gate::new(12.0, GateOp::Multiply(2), GateOp::Add(3)));
    }
}
