//! Sound bias control.

/// Ramp the sound bias level.
///
/// A `level` of zero ramps `SOUNDBIAS` down to 0; any other value ramps it
/// up to [`SOUND_BIAS_LEVEL_MAX`](crate::hw::SOUND_BIAS_LEVEL_MAX). The ramp
/// avoids the click a sudden bias change produces. The firmware adjusts the
/// level in small steps and returns once the target is reached.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub fn sound_bias(level: u32) {
    unsafe { crate::sys::SoundBias(level) }
}
