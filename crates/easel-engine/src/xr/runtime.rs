use anyhow::{anyhow, Context, Result};
use glam::Mat4;
use openxr as xr;

use super::hands::{HandEdge, HandTracker};
use super::pose::pose_to_mat4;
use super::HAND_COUNT;

/// Lifecycle and input notifications from the OpenXR session.
///
/// Hand indices are `0` (left) and `1` (right).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum XrEvent {
    SessionStarted,
    SessionEnded,
    Connected(usize),
    Disconnected(usize),
    SelectStart(usize),
}

const HAND_PATHS: [&str; HAND_COUNT] = ["/user/hand/left", "/user/hand/right"];

// (profile, select component)
const PROFILES: [(&str, &str); 4] = [
    ("/interaction_profiles/khr/simple_controller", "input/select/click"),
    ("/interaction_profiles/oculus/touch_controller", "input/trigger/value"),
    ("/interaction_profiles/valve/index_controller", "input/trigger/click"),
    ("/interaction_profiles/htc/vive_controller", "input/trigger/click"),
];

/// A loaded OpenXR instance with an optional running session.
pub struct XrRuntime {
    instance: xr::Instance,
    system: xr::SystemId,
    eye_height: f32,
    session: Option<ActiveSession>,
}

impl XrRuntime {
    pub(crate) fn new(instance: xr::Instance, system: xr::SystemId, eye_height: f32) -> Self {
        Self {
            instance,
            system,
            eye_height,
            session: None,
        }
    }

    /// `true` while a session object exists, running or not.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Creates a session. `SessionStarted` follows from [`poll_frame`] once
    /// the runtime reports it ready.
    ///
    /// [`poll_frame`]: Self::poll_frame
    pub fn start_session(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let session = ActiveSession::create(&self.instance, self.system, self.eye_height)?;
        log::info!("OpenXR session created");
        self.session = Some(session);
        Ok(())
    }

    /// Asks the runtime to wind the session down.
    ///
    /// A session that never started is dropped immediately.
    pub fn request_end(&mut self) {
        let Some(active) = self.session.as_mut() else { return };

        if active.running {
            if let Err(e) = active.session.request_exit() {
                log::warn!("OpenXR request_exit failed: {e:?}");
            }
        } else {
            log::info!("OpenXR session discarded before start");
            self.session = None;
        }
    }

    /// Drains runtime events and, while running, paces one frame and samples
    /// input. New events are appended to `out`.
    pub fn poll_frame(&mut self, out: &mut Vec<XrEvent>) -> Result<()> {
        let mut states = Vec::new();
        let mut lost = false;

        let mut buffer = xr::EventDataBuffer::new();
        while let Some(event) = self
            .instance
            .poll_event(&mut buffer)
            .map_err(|e| anyhow!("OpenXR poll_event: {e:?}"))?
        {
            match event {
                xr::Event::SessionStateChanged(e) => states.push(e.state()),
                xr::Event::InstanceLossPending(_) => lost = true,
                xr::Event::InteractionProfileChanged(_) => {
                    log::debug!("OpenXR interaction profile changed");
                }
                _ => {}
            }
        }

        for state in states {
            self.on_state(state, out)?;
        }
        if lost {
            log::warn!("OpenXR instance loss pending");
            self.drop_session(out);
        }

        if let Some(active) = self.session.as_mut().filter(|s| s.running) {
            active.frame(out)?;
        }
        Ok(())
    }

    pub fn controller_pose(&self, hand: usize) -> Option<Mat4> {
        self.session.as_ref()?.hand_poses.get(hand).copied().flatten()
    }

    pub fn head_pose(&self) -> Option<Mat4> {
        self.session.as_ref()?.head_pose
    }

    fn on_state(&mut self, state: xr::SessionState, out: &mut Vec<XrEvent>) -> Result<()> {
        log::debug!("OpenXR session state: {state:?}");
        let Some(active) = self.session.as_mut() else { return Ok(()) };

        match state {
            xr::SessionState::READY => {
                active
                    .session
                    .begin(xr::ViewConfigurationType::PRIMARY_STEREO)
                    .map_err(|e| anyhow!("OpenXR session begin: {e:?}"))?;
                active.running = true;
                out.push(XrEvent::SessionStarted);
            }
            xr::SessionState::STOPPING => {
                active.stop(out);
                active
                    .session
                    .end()
                    .map_err(|e| anyhow!("OpenXR session end: {e:?}"))?;
            }
            xr::SessionState::EXITING | xr::SessionState::LOSS_PENDING => {
                self.drop_session(out);
            }
            _ => {}
        }
        Ok(())
    }

    fn drop_session(&mut self, out: &mut Vec<XrEvent>) {
        if let Some(mut active) = self.session.take() {
            active.stop(out);
            log::info!("OpenXR session destroyed");
        }
    }
}

struct ActiveSession {
    session: xr::Session<xr::Headless>,
    frame_waiter: xr::FrameWaiter,
    frame_stream: xr::FrameStream<xr::Headless>,

    action_set: xr::ActionSet,
    select: xr::Action<bool>,
    aim: xr::Action<xr::Posef>,
    hand_paths: [xr::Path; HAND_COUNT],
    aim_spaces: [xr::Space; HAND_COUNT],
    base: xr::Space,
    view: xr::Space,

    running: bool,
    hands: [HandTracker; HAND_COUNT],
    hand_poses: [Option<Mat4>; HAND_COUNT],
    head_pose: Option<Mat4>,
}

impl ActiveSession {
    fn create(instance: &xr::Instance, system: xr::SystemId, eye_height: f32) -> Result<Self> {
        // SAFETY: headless sessions take no graphics handles.
        let (session, frame_waiter, frame_stream) = unsafe {
            instance.create_session::<xr::Headless>(system, &xr::headless::SessionCreateInfo {})
        }
        .map_err(|e| anyhow!("OpenXR create_session: {e:?}"))?;

        let hand_paths = [
            path(instance, HAND_PATHS[0])?,
            path(instance, HAND_PATHS[1])?,
        ];

        let action_set = instance
            .create_action_set("easel", "Easel", 0)
            .map_err(|e| anyhow!("OpenXR create_action_set: {e:?}"))?;
        let select = action_set
            .create_action::<bool>("select", "Select", &hand_paths)
            .map_err(|e| anyhow!("OpenXR create_action(select): {e:?}"))?;
        let aim = action_set
            .create_action::<xr::Posef>("aim", "Aim", &hand_paths)
            .map_err(|e| anyhow!("OpenXR create_action(aim): {e:?}"))?;

        for (profile, select_component) in PROFILES {
            if let Err(e) = suggest_bindings(instance, profile, select_component, &select, &aim) {
                log::debug!("bindings for {profile} rejected: {e:#}");
            }
        }

        session
            .attach_action_sets(&[&action_set])
            .map_err(|e| anyhow!("OpenXR attach_action_sets: {e:?}"))?;

        let aim_spaces = [
            aim.create_space(session.clone(), hand_paths[0], xr::Posef::IDENTITY)
                .map_err(|e| anyhow!("OpenXR aim space (left): {e:?}"))?,
            aim.create_space(session.clone(), hand_paths[1], xr::Posef::IDENTITY)
                .map_err(|e| anyhow!("OpenXR aim space (right): {e:?}"))?,
        ];

        let floor_offset = xr::Posef {
            orientation: xr::Quaternionf::IDENTITY,
            position: xr::Vector3f { x: 0.0, y: -eye_height, z: 0.0 },
        };
        let base = session
            .create_reference_space(xr::ReferenceSpaceType::LOCAL, floor_offset)
            .map_err(|e| anyhow!("OpenXR LOCAL space: {e:?}"))?;
        let view = session
            .create_reference_space(xr::ReferenceSpaceType::VIEW, xr::Posef::IDENTITY)
            .map_err(|e| anyhow!("OpenXR VIEW space: {e:?}"))?;

        Ok(Self {
            session,
            frame_waiter,
            frame_stream,
            action_set,
            select,
            aim,
            hand_paths,
            aim_spaces,
            base,
            view,
            running: false,
            hands: [HandTracker::default(); HAND_COUNT],
            hand_poses: [None; HAND_COUNT],
            head_pose: None,
        })
    }

    /// Waits for the runtime's frame slot, samples input, closes the frame.
    fn frame(&mut self, out: &mut Vec<XrEvent>) -> Result<()> {
        let state = self
            .frame_waiter
            .wait()
            .map_err(|e| anyhow!("OpenXR wait_frame: {e:?}"))?;
        self.frame_stream
            .begin()
            .map_err(|e| anyhow!("OpenXR begin_frame: {e:?}"))?;

        let time = state.predicted_display_time;
        self.sample(time, out);

        self.frame_stream
            .end(time, xr::EnvironmentBlendMode::OPAQUE, &[])
            .map_err(|e| anyhow!("OpenXR end_frame: {e:?}"))
            .context("closing headless frame")?;
        Ok(())
    }

    fn sample(&mut self, time: xr::Time, out: &mut Vec<XrEvent>) {
        if let Err(e) = self
            .session
            .sync_actions(&[xr::ActiveActionSet::new(&self.action_set)])
        {
            log::trace!("OpenXR sync_actions: {e:?}");
            return;
        }

        for hand in 0..HAND_COUNT {
            let path = self.hand_paths[hand];
            let active = self.aim.is_active(&self.session, path).unwrap_or(false);
            let pressed = self
                .select
                .state(&self.session, path)
                .map(|s| s.is_active && s.current_state)
                .unwrap_or(false);

            self.hands[hand].update(active, pressed, |edge| out.push(hand_event(hand, edge)));

            self.hand_poses[hand] = if active {
                locate(&self.aim_spaces[hand], &self.base, time)
            } else {
                None
            };
        }

        self.head_pose = locate(&self.view, &self.base, time);
    }

    /// Reports disconnects and `SessionEnded` if the session was running.
    fn stop(&mut self, out: &mut Vec<XrEvent>) {
        if !self.running {
            return;
        }
        for (hand, tracker) in self.hands.iter_mut().enumerate() {
            tracker.reset(|edge| out.push(hand_event(hand, edge)));
        }
        self.hand_poses = [None; HAND_COUNT];
        self.head_pose = None;
        self.running = false;
        out.push(XrEvent::SessionEnded);
    }
}

fn hand_event(hand: usize, edge: HandEdge) -> XrEvent {
    match edge {
        HandEdge::Connected => XrEvent::Connected(hand),
        HandEdge::Disconnected => XrEvent::Disconnected(hand),
        HandEdge::SelectStart => XrEvent::SelectStart(hand),
    }
}

fn path(instance: &xr::Instance, s: &str) -> Result<xr::Path> {
    instance
        .string_to_path(s)
        .map_err(|e| anyhow!("OpenXR path {s}: {e:?}"))
}

fn suggest_bindings(
    instance: &xr::Instance,
    profile: &str,
    select_component: &str,
    select: &xr::Action<bool>,
    aim: &xr::Action<xr::Posef>,
) -> Result<()> {
    let mut bindings = Vec::with_capacity(HAND_COUNT * 2);
    for hand in HAND_PATHS {
        bindings.push(xr::Binding::new(
            select,
            path(instance, &format!("{hand}/{select_component}"))?,
        ));
        bindings.push(xr::Binding::new(
            aim,
            path(instance, &format!("{hand}/input/aim/pose"))?,
        ));
    }

    instance
        .suggest_interaction_profile_bindings(path(instance, profile)?, &bindings)
        .map_err(|e| anyhow!("{e:?}"))
}

fn locate(space: &xr::Space, base: &xr::Space, time: xr::Time) -> Option<Mat4> {
    let location = space.locate(base, time).ok()?;
    let valid = xr::SpaceLocationFlags::POSITION_VALID | xr::SpaceLocationFlags::ORIENTATION_VALID;
    location
        .location_flags
        .contains(valid)
        .then(|| pose_to_mat4(&location.pose))
}
