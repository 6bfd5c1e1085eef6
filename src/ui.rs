use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlInputElement, HtmlVideoElement,
    SpeechSynthesisUtterance, Window,
};

use crate::classify::WasteCategory;
use crate::console;
use crate::js_value_to_string;
use crate::premium::PremiumFlag;
use crate::score::RankedScore;

pub(crate) const ACTIVE_USER_COLOR: &str = "#f1c40f";
const EMOJI_LIFETIME_MS: i32 = 2000;
const SPEECH_LANG: &str = "en-US";
const NAME_ALERT: &str = "Please enter your name first!";
const PASSWORD_ALERT: &str = "Please enter both username and password!";

pub(crate) fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    let Some(element) = document.get_element_by_id(id) else {
        console::warn(&format!("element not found: #{id}"));
        return None;
    };
    match element.dyn_into::<T>() {
        Ok(element) => Some(element),
        Err(_) => {
            console::warn(&format!("element #{id} has an unexpected type"));
            None
        }
    }
}

pub(crate) struct LoginForm {
    pub username: Option<HtmlInputElement>,
    pub password: Option<HtmlInputElement>,
    pub require_password: bool,
}

impl LoginForm {
    pub fn username(&self) -> String {
        self.username
            .as_ref()
            .map(|input| input.value().trim().to_string())
            .unwrap_or_default()
    }

    fn password(&self) -> String {
        self.password
            .as_ref()
            .map(|input| input.value().trim().to_string())
            .unwrap_or_default()
    }

    pub fn missing_fields_alert(&self, username: &str) -> Option<&'static str> {
        login_alert(self.require_password, username, &self.password())
    }
}

pub(crate) fn login_alert(
    require_password: bool,
    username: &str,
    password: &str,
) -> Option<&'static str> {
    let username_missing = username.trim().is_empty();
    if require_password && (username_missing || password.trim().is_empty()) {
        return Some(PASSWORD_ALERT);
    }
    if username_missing {
        return Some(NAME_ALERT);
    }
    None
}

pub(crate) struct Elements {
    pub camera: Option<HtmlVideoElement>,
    pub result: Option<HtmlElement>,
    pub tip: Option<HtmlElement>,
    pub login_section: Option<HtmlElement>,
    pub camera_section: Option<HtmlElement>,
    pub score_list: Option<HtmlElement>,
    pub waste_list: Option<HtmlElement>,
    pub premium_button: Option<HtmlElement>,
    pub premium_status: Option<HtmlElement>,
    pub login: LoginForm,
}

impl Elements {
    pub fn lookup(document: &Document) -> Self {
        let (premium_button, premium_status) = ensure_premium_controls(document);
        let require_password = document.get_element_by_id("start-btn").is_none();
        Self {
            camera: element_by_id(document, "camera"),
            result: element_by_id(document, "result"),
            tip: element_by_id(document, "tip"),
            login_section: element_by_id(document, "login-section"),
            camera_section: element_by_id(document, "camera-section"),
            score_list: element_by_id(document, "score-list"),
            waste_list: element_by_id(document, "waste-list"),
            premium_button,
            premium_status,
            login: LoginForm {
                username: element_by_id(document, "username"),
                password: if require_password {
                    element_by_id(document, "password")
                } else {
                    None
                },
                require_password,
            },
        }
    }

    pub fn show_game(&self) {
        set_display(self.login_section.as_ref(), "none");
        set_display(self.camera_section.as_ref(), "block");
    }

    pub fn set_result(&self, text: &str) {
        set_text(self.result.as_ref(), text);
    }

    pub fn set_tip(&self, text: &str) {
        set_text(self.tip.as_ref(), text);
    }
}

pub(crate) fn set_text(element: Option<&HtmlElement>, text: &str) {
    if let Some(element) = element {
        element.set_text_content(Some(text));
    }
}

fn set_display(element: Option<&HtmlElement>, display: &str) {
    if let Some(element) = element {
        let _ = element.style().set_property("display", display);
    }
}

fn create_html(document: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    document.create_element(tag)?.dyn_into::<HtmlElement>().map_err(JsValue::from)
}

pub(crate) fn scoreboard_line(row: &RankedScore<'_>) -> String {
    format!("#{} {}: {} pts", row.rank, row.username, row.points)
}

pub(crate) fn waste_line(index: usize, category: WasteCategory) -> String {
    format!("{}. {}", index + 1, category.label())
}

pub(crate) fn render_scoreboard(
    document: &Document,
    list: &HtmlElement,
    ranking: &[RankedScore<'_>],
    active_user: Option<&str>,
) -> Result<(), JsValue> {
    list.set_inner_html("");
    for row in ranking {
        let item = create_html(document, "li")?;
        item.set_text_content(Some(&scoreboard_line(row)));
        if Some(row.username) == active_user {
            let style = item.style();
            style.set_property("color", ACTIVE_USER_COLOR)?;
            style.set_property("font-weight", "bold")?;
        }
        list.append_child(&item)?;
    }
    Ok(())
}

pub(crate) fn render_waste_track(
    document: &Document,
    list: &HtmlElement,
    history: &[WasteCategory],
) -> Result<(), JsValue> {
    list.set_inner_html("");
    for (idx, category) in history.iter().enumerate() {
        let item = create_html(document, "li")?;
        item.set_text_content(Some(&waste_line(idx, *category)));
        list.append_child(&item)?;
    }
    Ok(())
}

pub(crate) fn speak(window: &Window, text: &str) {
    let spoken = (|| -> Result<(), JsValue> {
        let synth = window.speech_synthesis()?;
        let utterance = SpeechSynthesisUtterance::new_with_text(text)?;
        utterance.set_lang(SPEECH_LANG);
        synth.speak(&utterance);
        Ok(())
    })();
    if let Err(err) = spoken {
        console::warn(&format!("speak() failed: {}", js_value_to_string(&err)));
    }
}

pub(crate) fn alert(window: &Window, message: &str) {
    if let Err(err) = window.alert_with_message(message) {
        console::warn(&format!("alert failed: {}", js_value_to_string(&err)));
    }
}

/// Floats 3 to 6 copies of the category emoji over the bottom of `.app`
/// for two seconds.
pub(crate) fn spawn_emojis(
    window: &Window,
    document: &Document,
    category: WasteCategory,
    random: &mut impl FnMut() -> f64,
) -> Result<(), JsValue> {
    let Some(app) = document.query_selector(".app")? else {
        return Ok(());
    };
    let rect = app.get_bounding_client_rect();
    let count = 3 + (random() * 4.0).floor() as u32;
    let Some(body) = document.body() else {
        return Ok(());
    };

    for _ in 0..count {
        let emoji = create_html(document, "div")?;
        emoji.set_class_name("emoji");
        emoji.set_text_content(Some(category.emoji()));
        let left = rect.x() + random() * (rect.width() - 40.0).max(0.0);
        let top = rect.y() + rect.height() - 60.0 + random() * 20.0;
        let style = emoji.style();
        style.set_property("color", category.color())?;
        style.set_property("position", "fixed")?;
        style.set_property("left", &format!("{left}px"))?;
        style.set_property("top", &format!("{top}px"))?;
        style.set_property("font-size", "22px")?;
        style.set_property("z-index", "3000")?;
        body.append_child(&emoji)?;

        let remove = Closure::once_into_js(move || emoji.remove());
        window.set_timeout_with_callback_and_timeout_and_arguments_0(
            remove.unchecked_ref::<Function>(),
            EMOJI_LIFETIME_MS,
        )?;
    }
    Ok(())
}

fn styled_button(document: &Document, padding: &str) -> Result<HtmlElement, JsValue> {
    let button = create_html(document, "button")?;
    button.set_id("activate-premium");
    let style = button.style();
    style.set_property("padding", padding)?;
    style.set_property("border-radius", "22px")?;
    style.set_property("border", "none")?;
    style.set_property("cursor", "pointer")?;
    Ok(button)
}

fn build_floating_premium(document: &Document) -> Result<(), JsValue> {
    let Some(body) = document.body() else {
        return Ok(());
    };
    let floating = match document.get_element_by_id("basurayt-premium-float") {
        Some(existing) => existing.dyn_into::<HtmlElement>().map_err(JsValue::from)?,
        None => {
            let floating = create_html(document, "div")?;
            floating.set_id("basurayt-premium-float");
            let style = floating.style();
            style.set_property("position", "fixed")?;
            style.set_property("bottom", "12px")?;
            style.set_property("right", "12px")?;
            style.set_property("z-index", "2000")?;
            body.append_child(&floating)?;
            floating
        }
    };

    if document.get_element_by_id("activate-premium").is_none() {
        let button = styled_button(document, "10px 16px")?;
        floating.append_child(&button)?;
    }
    if document.get_element_by_id("premium-status").is_none() {
        let status = create_html(document, "div")?;
        status.set_id("premium-status");
        let style = status.style();
        style.set_property("font-size", "12px")?;
        style.set_property("margin-top", "6px")?;
        floating.append_child(&status)?;
    }
    Ok(())
}

fn build_sidebar_premium(document: &Document, sidebar: &Element) -> Result<(), JsValue> {
    let wrap = match sidebar.query_selector(".premium-control-wrap")? {
        Some(existing) => existing.dyn_into::<HtmlElement>().map_err(JsValue::from)?,
        None => {
            let wrap = create_html(document, "div")?;
            wrap.set_class_name("premium-control-wrap");
            let style = wrap.style();
            style.set_property("text-align", "center")?;
            style.set_property("margin-top", "12px")?;
            sidebar.append_child(&wrap)?;
            wrap
        }
    };

    if sidebar.query_selector("#activate-premium")?.is_none() {
        let button = styled_button(document, "10px 18px")?;
        wrap.append_child(&button)?;
    }
    if sidebar.query_selector("#premium-status")?.is_none() {
        let status = create_html(document, "p")?;
        status.set_id("premium-status");
        status.style().set_property("margin-top", "8px")?;
        wrap.append_child(&status)?;
    }
    Ok(())
}

pub(crate) fn ensure_premium_controls(
    document: &Document,
) -> (Option<HtmlElement>, Option<HtmlElement>) {
    let built = match document.get_element_by_id("premium") {
        Some(sidebar) => build_sidebar_premium(document, &sidebar),
        None => {
            console::warn("premium sidebar not found; creating a floating control instead");
            build_floating_premium(document)
        }
    };
    if let Err(err) = built {
        console::warn(&format!(
            "could not build premium controls: {}",
            js_value_to_string(&err)
        ));
    }

    (
        element_by_id(document, "activate-premium"),
        element_by_id(document, "premium-status"),
    )
}

pub(crate) fn render_premium(
    button: Option<&HtmlElement>,
    status: Option<&HtmlElement>,
    flag: PremiumFlag,
) {
    let (Some(button), Some(status)) = (button, status) else {
        return;
    };
    status.set_text_content(Some(flag.status_text()));
    let _ = status.style().set_property("color", flag.status_color());

    button.set_text_content(Some(flag.button_label()));
    let style = button.style();
    let _ = style.set_property("background", flag.button_background());
    let _ = style.set_property("color", "#fff");
    let _ = style.set_property("box-shadow", flag.button_shadow());
}

fn add_click_listener<F>(target: &Element, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub(crate) fn attach_sidebar_toggles(document: &Document) -> Result<(), JsValue> {
    for (toggle_id, panel_id) in [
        ("toggle-scoreboard", "scoreboard"),
        ("toggle-howto", "howto"),
        ("toggle-wastetrack", "wastetrack"),
    ] {
        let (Some(toggle), Some(panel)) = (
            element_by_id::<Element>(document, toggle_id),
            element_by_id::<Element>(document, panel_id),
        ) else {
            continue;
        };
        add_click_listener(&toggle, move |_event| {
            let _ = panel.class_list().add_1("visible");
        })?;
    }

    let close_buttons = document.query_selector_all(".close-btn")?;
    for idx in 0..close_buttons.length() {
        let Some(button) = close_buttons
            .get(idx)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let Some(target_id) = button.get_attribute("data-target") else {
            continue;
        };
        let doc = document.clone();
        add_click_listener(&button, move |_event| {
            if let Some(panel) = doc.get_element_by_id(&target_id) {
                let _ = panel.class_list().remove_1("visible");
            }
        })?;
    }
    Ok(())
}

pub(crate) fn on_click<F>(document: &Document, id: &str, handler: F) -> Result<bool, JsValue>
where
    F: FnMut(Event) + 'static,
{
    let Some(target) = element_by_id::<Element>(document, id) else {
        return Ok(false);
    };
    add_click_listener(&target, handler)?;
    Ok(true)
}

pub(crate) fn when_document_ready<F>(document: &Document, ready: F) -> Result<(), JsValue>
where
    F: FnOnce() + 'static,
{
    let state = Reflect::get(document, &JsValue::from_str("readyState"))?
        .as_string()
        .unwrap_or_default();
    if state != "loading" {
        ready();
        return Ok(());
    }

    let callback = Closure::once_into_js(ready);
    let options = Object::new();
    Reflect::set(&options, &JsValue::from_str("once"), &JsValue::TRUE)?;
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        callback.unchecked_ref(),
        options.unchecked_ref(),
    )?;
    Ok(())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn blank_document() -> Document {
        web_sys::window()
            .expect("no window")
            .document()
            .expect("no document")
            .implementation()
            .expect("implementation")
            .create_html_document_with_title("basurayt")
            .expect("html document")
    }

    fn document_with(body_html: &str) -> Document {
        let document = blank_document();
        document.body().expect("body").set_inner_html(body_html);
        document
    }

    fn count(document: &Document, selector: &str) -> u32 {
        document
            .query_selector_all(selector)
            .expect("selector")
            .length()
    }

    #[wasm_bindgen_test]
    fn scoreboard_highlights_active_user() {
        let document = document_with(r#"<ul id="score-list"><li>stale</li></ul>"#);
        let list: HtmlElement = element_by_id(&document, "score-list").expect("list");
        let ranking = [
            RankedScore { rank: 1, username: "Ana", points: 4 },
            RankedScore { rank: 2, username: "Ben", points: 1 },
        ];

        render_scoreboard(&document, &list, &ranking, Some("Ben")).expect("render");

        assert_eq!(list.child_element_count(), 2);
        let first = list
            .first_element_child()
            .expect("first")
            .dyn_into::<HtmlElement>()
            .expect("li");
        let second = list
            .last_element_child()
            .expect("second")
            .dyn_into::<HtmlElement>()
            .expect("li");
        assert_eq!(first.text_content().as_deref(), Some("#1 Ana: 4 pts"));
        assert_eq!(second.text_content().as_deref(), Some("#2 Ben: 1 pts"));
        assert_eq!(first.style().get_property_value("font-weight").unwrap(), "");
        assert_eq!(second.style().get_property_value("font-weight").unwrap(), "bold");
        assert_eq!(
            second.style().get_property_value("color").unwrap(),
            "rgb(241, 196, 15)"
        );
    }

    #[wasm_bindgen_test]
    fn waste_track_lists_history_in_order() {
        let document = document_with(r#"<ol id="waste-list"></ol>"#);
        let list: HtmlElement = element_by_id(&document, "waste-list").expect("list");
        let history = [WasteCategory::Biodegradable, WasteCategory::Recyclable];

        render_waste_track(&document, &list, &history).expect("render");

        assert_eq!(list.text_content().as_deref(), Some("1. biodegradable2. recyclable"));
    }

    #[wasm_bindgen_test]
    fn premium_controls_go_inside_sidebar() {
        let document = document_with(r#"<aside id="premium"><h2>Premium</h2></aside>"#);

        let (button, status) = ensure_premium_controls(&document);
        assert!(button.is_some() && status.is_some());
        assert_eq!(count(&document, "#premium .premium-control-wrap #activate-premium"), 1);
        assert_eq!(count(&document, "#premium .premium-control-wrap #premium-status"), 1);
        assert_eq!(count(&document, "#basurayt-premium-float"), 0);

        ensure_premium_controls(&document);
        assert_eq!(count(&document, "#activate-premium"), 1);
        assert_eq!(count(&document, "#premium-status"), 1);
    }

    #[wasm_bindgen_test]
    fn premium_controls_float_without_sidebar() {
        let document = blank_document();

        let (button, status) = ensure_premium_controls(&document);
        render_premium(button.as_ref(), status.as_ref(), PremiumFlag::default());

        assert_eq!(count(&document, "#basurayt-premium-float #activate-premium"), 1);
        assert_eq!(count(&document, "#basurayt-premium-float #premium-status"), 1);
        assert_eq!(
            status.expect("status").text_content().as_deref(),
            Some("Premium: OFF")
        );
        assert_eq!(
            button.expect("button").text_content().as_deref(),
            Some("🔓 Activate Premium")
        );
    }

    #[wasm_bindgen_test]
    fn sidebar_toggle_and_close_button() {
        let document = document_with(
            r#"<button id="toggle-scoreboard"></button>
               <div id="scoreboard"><button class="close-btn" data-target="scoreboard"></button></div>
               <button class="close-btn"></button>"#,
        );
        attach_sidebar_toggles(&document).expect("attach");

        let panel: Element = element_by_id(&document, "scoreboard").expect("panel");
        let toggle: HtmlElement = element_by_id(&document, "toggle-scoreboard").expect("toggle");
        let close = document
            .query_selector("#scoreboard .close-btn")
            .expect("selector")
            .expect("close")
            .dyn_into::<HtmlElement>()
            .expect("button");

        toggle.click();
        assert!(panel.class_list().contains("visible"));
        close.click();
        assert!(!panel.class_list().contains("visible"));
    }

    #[wasm_bindgen_test]
    fn lookup_tolerates_missing_elements() {
        let document = blank_document();
        let elements = Elements::lookup(&document);

        assert!(elements.camera.is_none());
        assert!(elements.result.is_none());
        assert!(elements.score_list.is_none());
        assert!(elements.waste_list.is_none());
        assert!(elements.login.username.is_none());
        assert!(elements.login.require_password);
        assert!(elements.premium_button.is_some());

        elements.show_game();
        elements.set_result("ignored");
        assert_eq!(
            elements.login.missing_fields_alert(""),
            Some(PASSWORD_ALERT)
        );
    }

    #[wasm_bindgen_test]
    fn ready_document_runs_immediately() {
        let document = blank_document();
        let ran = Rc::new(Cell::new(0));
        let ran_cb = Rc::clone(&ran);

        when_document_ready(&document, move || ran_cb.set(ran_cb.get() + 1)).expect("ready");
        assert_eq!(ran.get(), 1);
    }

    #[wasm_bindgen_test]
    fn loading_document_waits_for_one_dom_content_loaded() {
        let document = blank_document();
        let descriptor = Object::new();
        Reflect::set(&descriptor, &JsValue::from_str("value"), &JsValue::from_str("loading"))
            .expect("descriptor");
        Object::define_property(&document, &JsValue::from_str("readyState"), &descriptor);

        let ran = Rc::new(Cell::new(0));
        let ran_cb = Rc::clone(&ran);
        when_document_ready(&document, move || ran_cb.set(ran_cb.get() + 1)).expect("ready");
        assert_eq!(ran.get(), 0);

        for _ in 0..2 {
            let event = Event::new("DOMContentLoaded").expect("event");
            document.dispatch_event(&event).expect("dispatch");
        }
        assert_eq!(ran.get(), 1);
    }
}
