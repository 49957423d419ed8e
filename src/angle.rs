// angle.rs — 角度归一化

/// Map any finite angle into (-180, 180].
pub fn normalize(deg: f32) -> f32 {
    let mut a = deg.rem_euclid(360.0);
    // rem_euclid 对极小负数可能返回 360.0
    if a >= 360.0 {
        a -= 360.0;
    }
    if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Map any finite angle into [0, 360).
pub fn wrap_360(deg: f32) -> f32 {
    let a = deg.rem_euclid(360.0);
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_half_open_range() {
        assert_eq!(normalize(180.0), 180.0);
        assert_eq!(normalize(-180.0), 180.0);
        assert_eq!(normalize(190.0), -170.0);
        assert_eq!(normalize(-190.0), 170.0);
        assert_eq!(normalize(720.0), 0.0);
        let tiny = normalize(-1e-9);
        assert!(tiny > -180.0 && tiny <= 180.0);
    }

    #[test]
    fn wrap_is_non_negative() {
        assert_eq!(wrap_360(-10.0), 350.0);
        assert_eq!(wrap_360(370.0), 10.0);
        let w = wrap_360(-1e-9);
        assert!((0.0..360.0).contains(&w));
    }
}
