//! GTK-backed window manager: one main loop, one native window per registered [`Window`].
//!
//! Everything here lives on the thread that called [`WindowManager::initialize`];
//! the handle is `!Send`, so windows cannot be created from producer threads.

mod cairo_surface;
mod dispatch;
mod input_bridge;

pub use dispatch::{dispatch_key, KeyOutcome, WindowDispatcher, HELP_KEY};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gtk4::prelude::*;

use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::state::{
    ManagerEvent, ManagerState, RegistrationError, RegistrationResult, SharedContext,
};
use crate::window::{MouseEvent, Window, WindowId};

use self::cairo_surface::CairoSurface;
use self::input_bridge::{button_state, translate_key};

static GTK_INITIALIZED: AtomicBool = AtomicBool::new(false);

struct NativeWindow {
    window: gtk4::Window,
    area: gtk4::DrawingArea,
}

struct ManagerInner {
    shared: Arc<SharedContext>,
    render_interval: Duration,
    dispatcher: RefCell<WindowDispatcher>,
    natives: RefCell<HashMap<WindowId, NativeWindow>>,
    main_loop: gtk4::glib::MainLoop,
}

#[derive(Clone)]
pub struct WindowManager {
    inner: Rc<ManagerInner>,
}

impl WindowManager {
    /// One-time toolkit setup. A second call in the same process fails, as does a missing display.
    pub fn initialize(shared: Arc<SharedContext>, settings: &Settings) -> AppResult<Self> {
        claim_toolkit(&GTK_INITIALIZED, gtk4::init)?;

        let mut dispatcher = WindowDispatcher::new();
        dispatcher.transition(ManagerEvent::Initialize)?;
        tracing::info!(
            render_interval_ms = settings.render_interval().as_millis() as u64,
            "window manager initialized"
        );

        Ok(Self {
            inner: Rc::new(ManagerInner {
                shared,
                render_interval: settings.render_interval(),
                dispatcher: RefCell::new(dispatcher),
                natives: RefCell::new(HashMap::new()),
                main_loop: gtk4::glib::MainLoop::new(None, false),
            }),
        })
    }

    pub fn shared(&self) -> &Arc<SharedContext> {
        &self.inner.shared
    }

    pub fn state(&self) -> ManagerState {
        self.inner.dispatcher.borrow().state()
    }

    pub fn create_window<W, F, E>(&self, build: F) -> AppResult<Rc<W>>
    where
        W: Window + 'static,
        F: FnOnce(WindowId) -> Result<W, E>,
        AppError: From<E>,
    {
        let window = self.inner.dispatcher.borrow_mut().register_with(build)?;
        let native = self.build_native(window.as_ref());
        native.window.present();
        self.inner.natives.borrow_mut().insert(window.id(), native);
        Ok(window)
    }

    pub fn unregister(&self, id: WindowId) -> AppResult<()> {
        self.inner.dispatcher.borrow_mut().unregister(id)?;
        if let Some(native) = self.inner.natives.borrow_mut().remove(&id) {
            native.window.destroy();
        }
        Ok(())
    }

    /// Runs the main loop until quit is requested. Valid once, after `initialize`.
    pub fn start_loop(&self) -> AppResult<()> {
        self.inner
            .dispatcher
            .borrow_mut()
            .transition(ManagerEvent::StartLoop)?;
        self.install_render_tick();

        tracing::info!(windows = self.inner.natives.borrow().len(), "entering render loop");
        self.inner.main_loop.run();
        tracing::info!("render loop finished");

        self.inner
            .dispatcher
            .borrow_mut()
            .transition(ManagerEvent::Stop)?;
        let natives = self.inner.natives.borrow_mut().drain().collect::<Vec<_>>();
        for (_, native) in natives {
            native.window.destroy();
        }
        Ok(())
    }

    fn install_render_tick(&self) {
        let inner = Rc::downgrade(&self.inner);
        gtk4::glib::timeout_add_local(self.inner.render_interval, move || {
            let Some(inner) = inner.upgrade() else {
                return gtk4::glib::ControlFlow::Break;
            };
            if inner.shared.is_quit() {
                tracing::debug!("quit observed by render tick");
                inner.main_loop.quit();
                return gtk4::glib::ControlFlow::Break;
            }
            for native in inner.natives.borrow().values() {
                native.area.queue_draw();
            }
            gtk4::glib::ControlFlow::Continue
        });
    }

    fn build_native(&self, window: &dyn Window) -> NativeWindow {
        let id = window.id();
        let name = window.base().name();
        let geometry = window.base().geometry();
        if (geometry.x, geometry.y) != (0, 0) {
            tracing::debug!(window_id = %id, x = geometry.x, y = geometry.y, "window position is left to the compositor");
        }

        let native_window = gtk4::Window::builder()
            .title(name.as_str())
            .default_width(geometry.width)
            .default_height(geometry.height)
            .build();
        let area = gtk4::DrawingArea::new();
        area.set_hexpand(true);
        area.set_vexpand(true);
        area.set_focusable(true);
        native_window.set_child(Some(&area));

        {
            let inner = Rc::downgrade(&self.inner);
            area.set_draw_func(move |_, context, width, height| {
                let Some(window) = lookup(&inner, id) else {
                    return;
                };
                let mut surface = CairoSurface::new(context, width, height);
                window.display_handler(&mut surface);
            });
        }
        {
            let inner = Rc::downgrade(&self.inner);
            area.connect_resize(move |_, width, height| {
                if let Some(window) = lookup(&inner, id) {
                    tracing::debug!(window_id = %id, width, height, "window reshaped");
                    window.reshape_handler(width, height);
                }
            });
        }
        {
            let inner = Rc::downgrade(&self.inner);
            let key_controller = gtk4::EventControllerKey::new();
            key_controller.connect_key_pressed(move |_, key, keycode, _| {
                let Some(character) = translate_key(key, keycode) else {
                    return gtk4::glib::Propagation::Proceed;
                };
                let Some(window) = lookup(&inner, id) else {
                    return gtk4::glib::Propagation::Proceed;
                };
                match dispatch_key(window.as_ref(), character) {
                    KeyOutcome::Ignored => gtk4::glib::Propagation::Proceed,
                    KeyOutcome::Handled | KeyOutcome::Help => {
                        if let Some(inner) = inner.upgrade() {
                            inner.sync_native(window.as_ref());
                        }
                        gtk4::glib::Propagation::Stop
                    }
                }
            });
            native_window.add_controller(key_controller);
        }
        {
            let inner = Rc::downgrade(&self.inner);
            let click = gtk4::GestureClick::new();
            click.set_button(0);
            let press_inner = inner.clone();
            click.connect_pressed(move |gesture, _, x, y| {
                dispatch_mouse(&press_inner, id, gesture.current_button(), true, x, y);
            });
            click.connect_released(move |gesture, _, x, y| {
                dispatch_mouse(&inner, id, gesture.current_button(), false, x, y);
            });
            area.add_controller(click);
        }
        {
            let shared = self.inner.shared.clone();
            native_window.connect_close_request(move |_| {
                tracing::info!(window_id = %id, "window closed; requesting quit");
                shared.quit();
                gtk4::glib::Propagation::Stop
            });
        }

        NativeWindow {
            window: native_window,
            area,
        }
    }
}

impl ManagerInner {
    fn sync_native(&self, window: &dyn Window) {
        let natives = self.natives.borrow();
        let Some(native) = natives.get(&window.id()) else {
            return;
        };
        let fullscreen = window.base().is_fullscreen();
        if native.window.is_fullscreen() != fullscreen {
            if fullscreen {
                native.window.fullscreen();
            } else {
                native.window.unfullscreen();
            }
        }
        native.area.queue_draw();
    }
}

/// Runs `init` at most once per `flag`. A failed init releases the flag so a later call can retry.
fn claim_toolkit<E: std::fmt::Display>(
    flag: &AtomicBool,
    init: impl FnOnce() -> Result<(), E>,
) -> RegistrationResult<()> {
    if flag.swap(true, Ordering::SeqCst) {
        return Err(RegistrationError::AlreadyInitialized);
    }
    if let Err(err) = init() {
        flag.store(false, Ordering::SeqCst);
        return Err(RegistrationError::NoDisplay(err.to_string()));
    }
    Ok(())
}

fn lookup(inner: &Weak<ManagerInner>, id: WindowId) -> Option<Rc<dyn Window>> {
    let inner = inner.upgrade()?;
    let window = inner.dispatcher.borrow().window(id);
    match window {
        Ok(window) => Some(window),
        Err(err) => {
            tracing::trace!(%err, "callback for a window that is gone");
            None
        }
    }
}

fn dispatch_mouse(
    inner: &Weak<ManagerInner>,
    id: WindowId,
    button: u32,
    pressed: bool,
    x: f64,
    y: f64,
) {
    if let Some(window) = lookup(inner, id) {
        window.mouse_handler(MouseEvent {
            button,
            state: button_state(pressed),
            x,
            y,
        });
    }
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("state", &self.state())
            .field("render_interval", &self.inner.render_interval)
            .field("windows", &self.inner.natives.borrow().len())
            .finish()
    }
}
