use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::{Instant, sleep};

use crate::animation::ease::Ease;
use crate::animation::tween::{Stage, Track, Tween};
use crate::photo::data::PhotoData;
use crate::repository::render::RenderAdapter;

enum Active {
    Delay(Instant),
    Tween { tween: Tween, started: Instant },
}

struct Runner {
    track: Track,
    active: Option<Active>,
}

/// Frame-stepped executor for animation tracks.
///
/// All tracks of one call advance together; the call returns once every track
/// finished or was superseded by a newer target on its photo.
#[derive(Clone, Copy, Debug)]
pub struct Animator {
    pub frame: Duration,
    pub ease: Ease,
}

impl Animator {
    pub async fn run<A: RenderAdapter>(
        &self,
        photos: &mut IndexMap<String, PhotoData>,
        adapter: &mut A,
        tracks: Vec<Track>,
    ) {
        let mut runners: Vec<Runner> = tracks
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(|track| Runner {
                track,
                active: None,
            })
            .collect();
        if runners.is_empty() {
            return;
        }
        tracing::debug!(tracks = runners.len(), "animation batch started");

        loop {
            let now = Instant::now();
            runners.retain_mut(|r| self.step(photos, adapter, r, now));
            if runners.is_empty() {
                break;
            }
            sleep(self.frame).await;
        }
    }

    /// Advance one track as far as `now` allows. Returns `false` when it is done.
    fn step<A: RenderAdapter>(
        &self,
        photos: &mut IndexMap<String, PhotoData>,
        adapter: &mut A,
        runner: &mut Runner,
        now: Instant,
    ) -> bool {
        let Some(photo) = photos.get_mut(&runner.track.photo_id) else {
            return false;
        };
        loop {
            if photo.generation() != runner.track.generation {
                tracing::trace!(photo = photo.id(), "animation superseded");
                return false;
            }

            match &runner.active {
                Some(Active::Delay(until)) => {
                    if now < *until {
                        return true;
                    }
                    runner.active = None;
                }
                Some(Active::Tween { tween, started }) => {
                    let elapsed = now.saturating_duration_since(*started);
                    let (pos, opacity) = tween.sample(elapsed);
                    photo.place_at(pos);
                    photo.set_opacity(opacity);
                    if let Some(h) = photo.visual() {
                        adapter.update_visual(h, pos, photo.opacity());
                    }
                    if !tween.is_done(elapsed) {
                        return true;
                    }
                    runner.active = None;
                }
                None => {}
            }

            let Some(stage) = runner.track.stages.pop_front() else {
                return false;
            };
            match stage {
                Stage::Place { at, opacity } => {
                    photo.place_at(at);
                    photo.set_opacity(opacity);
                    if let Some(h) = photo.visual() {
                        adapter.update_visual(h, at, photo.opacity());
                    }
                }
                Stage::State(state) => photo.set_animation_state(state),
                Stage::Delay(d) => runner.active = Some(Active::Delay(now + d)),
                Stage::MoveTo {
                    to,
                    to_opacity,
                    duration,
                } => {
                    let from_opacity = photo.opacity();
                    let tween = Tween::position(photo.current_position(), to, from_opacity, duration)
                        .with_opacity(from_opacity, to_opacity.unwrap_or(from_opacity))
                        .with_ease(self.ease);
                    runner.active = Some(Active::Tween {
                        tween,
                        started: now,
                    });
                }
                Stage::Tween(tween) => {
                    runner.active = Some(Active::Tween {
                        tween,
                        started: now,
                    });
                }
                Stage::Detail { high_res } => {
                    if let Some(h) = photo.visual() {
                        adapter.set_detail(h, high_res);
                    }
                }
            }
        }
    }
}
