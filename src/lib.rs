pub mod camera;
pub mod classify;
mod console;
pub mod game;
pub mod media;
pub mod premium;
pub mod score;
pub mod storage;
mod ui;

use js_sys::{Function, Object, Promise, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, MediaStream, Window};

use camera::CameraSlot;
use classify::classify;
use game::Game;
use media::BrowserMedia;
use storage::BrowserStorage;
use ui::Elements;

const SW_BOOTSTRAP_URL: &str = "/sw_bootstrap.js";
const CAMERA_ALERT: &str =
    "Camera not accessible. Please allow camera permissions or try another device.";
const RESET_MESSAGE: &str = "Points reset!";
const RESET_ANNOUNCEMENT: &str = "Points reset to zero";

struct Page {
    window: Window,
    document: Document,
    game: Game<BrowserStorage>,
    camera: CameraSlot<MediaStream>,
    ui: Elements,
}

impl Page {
    fn render_scoreboard(&self) {
        let Some(list) = self.ui.score_list.as_ref() else {
            return;
        };
        let ranking = self.game.ranking();
        let active = self.game.session().map(|session| session.username());
        if let Err(err) = ui::render_scoreboard(&self.document, list, &ranking, active) {
            console::warn(&format!("scoreboard render failed: {}", js_value_to_string(&err)));
        }
    }

    fn render_waste_track(&self) {
        let Some(list) = self.ui.waste_list.as_ref() else {
            return;
        };
        let history = self
            .game
            .session()
            .map(|session| session.waste_history())
            .unwrap_or_default();
        if let Err(err) = ui::render_waste_track(&self.document, list, history) {
            console::warn(&format!("waste track render failed: {}", js_value_to_string(&err)));
        }
    }

    fn render_premium(&self) {
        ui::render_premium(
            self.ui.premium_button.as_ref(),
            self.ui.premium_status.as_ref(),
            self.game.premium(),
        );
    }
}

pub(crate) fn js_value_to_string(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn service_worker_disabled(search: &str) -> bool {
    search
        .trim_start_matches('?')
        .split('&')
        .any(|pair| pair == "nosw=1")
}

async fn register_service_worker(win: &Window) -> Result<String, String> {
    let search = win.location().search().unwrap_or_default();
    if service_worker_disabled(&search) {
        return Err("disabled via nosw=1".to_string());
    }

    let nav_js: JsValue = win.navigator().into();
    let container = Reflect::get(&nav_js, &JsValue::from_str("serviceWorker"))
        .map_err(|err| js_value_to_string(&err))?;
    if container.is_undefined() || container.is_null() {
        return Err("service worker unsupported".to_string());
    }
    let register = Reflect::get(&container, &JsValue::from_str("register"))
        .ok()
        .and_then(|register| register.dyn_into::<Function>().ok())
        .ok_or_else(|| "serviceWorker.register missing".to_string())?;

    // The bootstrap imports the wasm worker, so it must load as a module.
    let options = Object::new();
    Reflect::set(&options, &JsValue::from_str("type"), &JsValue::from_str("module"))
        .map_err(|err| js_value_to_string(&err))?;

    let pending = register
        .call2(&container, &JsValue::from_str(SW_BOOTSTRAP_URL), &options)
        .map_err(|err| js_value_to_string(&err))?;
    let registration = JsFuture::from(Promise::from(pending))
        .await
        .map_err(|err| js_value_to_string(&err))?;
    let scope = Reflect::get(&registration, &JsValue::from_str("scope"))
        .ok()
        .and_then(|scope| scope.as_string())
        .unwrap_or_default();

    Ok(format!("service worker registered (scope={scope})"))
}

fn start_camera(page: Rc<RefCell<Page>>) {
    let Some(media) = BrowserMedia::from_window(&page.borrow().window) else {
        console::warn("MediaDevices API not supported.");
        return;
    };

    {
        let mut pg = page.borrow_mut();
        pg.camera.release();
        if let Some(video) = &pg.ui.camera {
            video.set_src_object(None);
        }
    }

    spawn_local(async move {
        match camera::acquire(&media).await {
            Ok(acquired) => {
                let (video, stream) = {
                    let mut pg = page.borrow_mut();
                    let stream = pg.camera.install(acquired.stream).clone();
                    (pg.ui.camera.clone(), stream)
                };
                if let Some(video) = video {
                    media::show_stream(&video, Some(&stream)).await;
                }
            }
            Err(err) => {
                console::error(&format!("camera fatal error: {err}"));
                let win = page.borrow().window.clone();
                ui::alert(&win, CAMERA_ALERT);
            }
        }
    });
}

fn handle_login(page: &Rc<RefCell<Page>>) {
    {
        let mut pg = page.borrow_mut();
        let username = pg.ui.login.username();
        if let Some(message) = pg.ui.login.missing_fields_alert(&username) {
            ui::alert(&pg.window, message);
            return;
        }
        if let Err(err) = pg.game.login(&username).map(|_| ()) {
            console::warn(&format!("login ignored: {err}"));
            return;
        }
        pg.ui.show_game();
        pg.render_scoreboard();
    }

    start_camera(Rc::clone(page));
}

fn handle_scan(page: &Rc<RefCell<Page>>) {
    let mut random = js_sys::Math::random;
    let mut pg = page.borrow_mut();
    let picked = classify(&mut random);

    ui::speak(&pg.window, picked.category.announcement());
    pg.ui.set_result(&picked.result_text());
    pg.ui.set_tip(picked.tip);
    if let Err(err) = ui::spawn_emojis(&pg.window, &pg.document, picked.category, &mut random) {
        console::warn(&format!("spawnEmojis error: {}", js_value_to_string(&err)));
    }

    if let Err(err) = pg.game.scan(picked.category) {
        console::warn(&format!("scan not credited: {err}"));
    }
    pg.render_scoreboard();
    pg.render_waste_track();
}

fn handle_reset(page: &Rc<RefCell<Page>>) {
    let mut pg = page.borrow_mut();
    if let Err(err) = pg.game.reset() {
        console::warn(&format!("reset ignored: {err}"));
    }
    pg.ui.set_result(RESET_MESSAGE);
    pg.ui.set_tip("");
    ui::speak(&pg.window, RESET_ANNOUNCEMENT);
    pg.render_scoreboard();
    pg.render_waste_track();
}

fn handle_premium_toggle(page: &Rc<RefCell<Page>>) {
    let mut pg = page.borrow_mut();
    let flag = pg.game.toggle_premium();
    pg.render_premium();
    ui::speak(&pg.window, flag.announcement());
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let Some(document) = web_sys::window().and_then(|win| win.document()) else {
        web_sys::console::error_1(&JsValue::from_str("[BASURAYT] no document"));
        return;
    };

    let ready = || {
        if let Err(err) = start_impl() {
            console::error(&format!("fatal: {}", js_value_to_string(&err)));
        }
    };
    if let Err(err) = ui::when_document_ready(&document, ready) {
        web_sys::console::error_1(&err);
    }
}

fn start_impl() -> Result<(), JsValue> {
    let win = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = win
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let store = BrowserStorage::local();
    if !store.is_available() {
        console::warn("localStorage unavailable; scores will not survive a reload");
    }

    let page = Rc::new(RefCell::new(Page {
        window: win.clone(),
        document: document.clone(),
        game: Game::load(store),
        camera: CameraSlot::default(),
        ui: Elements::lookup(&document),
    }));

    let win_sw = win.clone();
    spawn_local(async move {
        match register_service_worker(&win_sw).await {
            Ok(details) => console::info(&details),
            Err(reason) => console::info(&format!("service worker skipped ({reason})")),
        }
    });

    let page_login = Rc::clone(&page);
    let login_id = if document.get_element_by_id("start-btn").is_some() {
        "start-btn"
    } else {
        "login-btn"
    };
    ui::on_click(&document, login_id, move |_event| handle_login(&page_login))?;

    let page_scan = Rc::clone(&page);
    if !ui::on_click(&document, "capture", move |_event| handle_scan(&page_scan))? {
        console::warn("capture button (#capture) missing.");
    }

    let page_reset = Rc::clone(&page);
    ui::on_click(&document, "reset", move |_event| handle_reset(&page_reset))?;

    let page_premium = Rc::clone(&page);
    ui::on_click(&document, "activate-premium", move |_event| {
        handle_premium_toggle(&page_premium)
    })?;

    ui::attach_sidebar_toggles(&document)?;

    let pg = page.borrow();
    pg.render_premium();
    pg.render_scoreboard();
    pg.render_waste_track();
    console::info(&format!(
        "script initialized. Premium active: {}",
        pg.game.premium().is_active()
    ));

    Ok(())
}
