//! Parallax background: dust motes and the fog layer

use glam::DVec2;
use rand::Rng;

use super::mask::SpriteId;
use super::physics::{frnd, wrap};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustMote {
    pub pos: DVec2,
    /// Depth; deeper motes scroll slower
    pub z: f64,
}

/// Motes sharing one grey level
#[derive(Debug, Clone)]
pub struct DustGroup {
    pub shade: u8,
    pub motes: Vec<DustMote>,
}

#[derive(Debug, Clone, Default)]
pub struct DustField {
    groups: Vec<DustGroup>,
}

impl DustField {
    pub fn new(rng: &mut impl Rng, settings: &Settings) -> Self {
        let n_groups = settings.n_dust_groups.max(1);
        let per_group = settings.n_dust_motes / n_groups;
        let depth = settings.max_dust_depth;
        let groups = (0..n_groups)
            .map(|_| {
                let z = depth * frnd(rng).sqrt();
                let shade = if depth > 0.0 {
                    ((depth - z) * 255.0 / depth) as u8
                } else {
                    255
                };
                let motes = (0..per_group)
                    .map(|_| DustMote {
                        pos: DVec2::new(
                            (frnd(rng) * (settings.win_width - 5.0)).floor(),
                            (frnd(rng) * (settings.win_height - 5.0)).floor(),
                        ),
                        z: depth * frnd(rng).sqrt(),
                    })
                    .collect();
                DustGroup { shade, motes }
            })
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[DustGroup] {
        &self.groups
    }

    /// Scroll every mote against the camera and wrap it around the screen
    pub fn update(&mut self, scroll: DVec2, dt: f64, win: DVec2) {
        let shift = scroll * dt;
        for mote in self.groups.iter_mut().flat_map(|g| g.motes.iter_mut()) {
            let factor = 1.3 + mote.z;
            mote.pos.x = wrap(mote.pos.x - shift.x / factor, win.x);
            mote.pos.y = wrap(mote.pos.y - shift.y / factor, win.y);
        }
    }
}

/// Translucent backdrop drawn twice side by side, scrolling at half speed
#[derive(Debug, Clone, PartialEq)]
pub struct Fog {
    pub sprite: Option<SpriteId>,
    pub offset: f64,
    pub width: f64,
}

impl Fog {
    pub fn new(sprite: Option<SpriteId>, width: f64) -> Self {
        Self {
            sprite,
            offset: 0.0,
            width,
        }
    }

    pub fn update(&mut self, scroll: DVec2, dt: f64) {
        self.offset -= scroll.x * dt / 2.0;
        if self.offset < -self.width {
            self.offset = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_field_shape() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let dust = DustField::new(&mut rng, &settings);
        assert_eq!(dust.groups().len(), 15);
        assert!(dust.groups().iter().all(|g| g.motes.len() == 100));
    }

    #[test]
    fn test_motes_stay_on_screen() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(8);
        let mut dust = DustField::new(&mut rng, &settings);
        for _ in 0..500 {
            dust.update(DVec2::new(9.0, -3.0), 1.0, settings.window());
        }
        for mote in dust.groups().iter().flat_map(|g| g.motes.iter()) {
            assert!(mote.pos.x > 0.0 && mote.pos.x < settings.win_width);
            assert!(mote.pos.y > 0.0 && mote.pos.y < settings.win_height);
        }
    }

    #[test]
    fn test_near_motes_move_faster() {
        let mut dust = DustField {
            groups: vec![DustGroup {
                shade: 255,
                motes: vec![
                    DustMote {
                        pos: DVec2::new(500.0, 300.0),
                        z: 0.0,
                    },
                    DustMote {
                        pos: DVec2::new(500.0, 300.0),
                        z: 1.0,
                    },
                ],
            }],
        };
        dust.update(DVec2::new(4.6, 0.0), 1.0, DVec2::new(1024.0, 640.0));
        let motes = &dust.groups()[0].motes;
        assert!((motes[0].pos.x - (500.0 - 4.6 / 1.3)).abs() < 1e-9);
        assert!((motes[1].pos.x - (500.0 - 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_fog_resets_after_one_width() {
        let mut fog = Fog::new(Some(SpriteId(1)), 100.0);
        fog.update(DVec2::new(10.0, 0.0), 1.0);
        assert_eq!(fog.offset, -5.0);
        for _ in 0..20 {
            fog.update(DVec2::new(10.0, 0.0), 1.0);
        }
        assert_eq!(fog.offset, 0.0);
    }
}
