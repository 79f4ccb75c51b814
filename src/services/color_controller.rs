//! Single-writer color state behind the picker UI.
//!
//! Every interaction (image click, slider drag, wheel pick, palette or
//! history selection) becomes one [`ColorEvent`]. The controller runs one
//! conversion pass for it, stores the result and publishes a
//! [`ColorSnapshot`] for the display. Display code that reacts to the
//! snapshot by moving sliders may call [`ColorController::apply`] again;
//! those nested calls are dropped so a slider update cannot feed back into
//! another conversion.

use chroma_color::{
    cmykw_to_rgb, hsl_to_rgb, rgb_to_cmykw, rgb_to_hsl, Cmykw, CmykwChannel, Contrast, Hsl,
    HslChannel, HueWheel, Rgb,
};
use std::cell::{Cell, RefCell};

/// A user interaction that changes the current color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorEvent {
    /// A color picked from an image, camera frame, palette or history
    PickRgb(Rgb),
    /// One CMYKW slider moved
    SetCmykw(CmykwChannel, u8),
    /// One HSL slider moved
    SetHsl(HslChannel, f64),
    /// Click on the hue wheel, offset from its centre
    PickWheel { dx: f64, dy: f64 },
    /// Back to white
    Reset,
}

/// Everything the display needs after one event
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSnapshot {
    pub rgb: Rgb,
    pub cmykw: Cmykw,
    pub hsl: Hsl,
    pub hex: String,
    pub contrast: Contrast,
    /// Selection marker offset on the hue wheel
    pub marker: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ColorState {
    rgb: Rgb,
    cmykw: Cmykw,
    hsl: Hsl,
}

impl ColorState {
    const WHITE: ColorState = ColorState {
        rgb: Rgb::WHITE,
        cmykw: Cmykw::WHITE,
        hsl: Hsl::new(0.0, 0.0, 100.0),
    };

    fn from_rgb(rgb: Rgb) -> Self {
        Self {
            rgb,
            cmykw: rgb_to_cmykw(rgb),
            hsl: rgb_to_hsl(rgb),
        }
    }

    fn from_hsl(hsl: Hsl) -> Self {
        let rgb = hsl_to_rgb(hsl);
        Self {
            rgb,
            cmykw: rgb_to_cmykw(rgb),
            hsl,
        }
    }

    /// State after `event`, or `None` if the event selects nothing.
    fn apply(self, event: ColorEvent, wheel: &HueWheel) -> Option<Self> {
        match event {
            ColorEvent::PickRgb(rgb) => Some(Self::from_rgb(rgb)),
            ColorEvent::SetCmykw(channel, value) => {
                let cmykw = self.cmykw.with(channel, value);
                let rgb = cmykw_to_rgb(cmykw);
                Some(Self {
                    rgb,
                    cmykw,
                    hsl: rgb_to_hsl(rgb),
                })
            }
            ColorEvent::SetHsl(channel, value) => {
                if !value.is_finite() {
                    return None;
                }
                let hsl = self.hsl.with(channel, value);
                Some(Self::from_hsl(Hsl::new(
                    hsl.h.rem_euclid(360.0),
                    hsl.s.clamp(0.0, 100.0),
                    hsl.l.clamp(0.0, 100.0),
                )))
            }
            ColorEvent::PickWheel { dx, dy } => {
                let (hue, saturation) = wheel.pick(dx, dy)?;
                Some(Self::from_hsl(Hsl::new(hue, saturation, self.hsl.l)))
            }
            ColorEvent::Reset => Some(Self::WHITE),
        }
    }
}

type SnapshotListener = Box<dyn Fn(&ColorController, &ColorSnapshot)>;

/// Resets the in-progress flag even if a listener panics.
struct ApplyGuard<'a>(&'a Cell<bool>);

impl<'a> ApplyGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for ApplyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct ColorController {
    state: RefCell<ColorState>,
    wheel: HueWheel,
    applying: Cell<bool>,
    listener: Option<SnapshotListener>,
}

impl ColorController {
    /// Controller starting at white, with the default wheel.
    pub fn new() -> Self {
        Self::with_wheel(HueWheel::default())
    }

    pub fn with_wheel(wheel: HueWheel) -> Self {
        Self {
            state: RefCell::new(ColorState::WHITE),
            wheel,
            applying: Cell::new(false),
            listener: None,
        }
    }

    /// Register the display callback, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl Fn(&ColorController, &ColorSnapshot) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Apply one event.
    ///
    /// Returns the new snapshot, or `None` when the event was ignored
    /// (nested call from the listener, wheel click outside the rim, or a
    /// non-finite slider value).
    pub fn apply(&self, event: ColorEvent) -> Option<ColorSnapshot> {
        if self.applying.get() {
            tracing::trace!(?event, "Ignoring nested color event");
            return None;
        }
        let _guard = ApplyGuard::enter(&self.applying);

        let snapshot = {
            let mut state = self.state.borrow_mut();
            let next = state.apply(event, &self.wheel)?;
            *state = next;
            self.snapshot_of(next)
        };

        tracing::trace!(rgb = %snapshot.rgb, cmykw = %snapshot.cmykw, "Color updated");
        if let Some(listener) = &self.listener {
            listener(self, &snapshot);
        }
        Some(snapshot)
    }

    fn snapshot_of(&self, state: ColorState) -> ColorSnapshot {
        ColorSnapshot {
            rgb: state.rgb,
            cmykw: state.cmykw,
            hsl: state.hsl,
            hex: state.rgb.to_hex(),
            contrast: state.rgb.contrast_text(),
            marker: self.wheel.marker_for(state.hsl),
        }
    }

    /// Current state
    pub fn snapshot(&self) -> ColorSnapshot {
        self.snapshot_of(*self.state.borrow())
    }

    pub fn rgb(&self) -> Rgb {
        self.state.borrow().rgb
    }

    pub fn cmykw(&self) -> Cmykw {
        self.state.borrow().cmykw
    }

    pub fn hsl(&self) -> Hsl {
        self.state.borrow().hsl
    }

    pub fn wheel(&self) -> &HueWheel {
        &self.wheel
    }
}

impl Default for ColorController {
    fn default() -> Self {
        Self::new()
    }
}
