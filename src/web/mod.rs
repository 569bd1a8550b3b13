//! Browser bindings.
//!
//! Registers the page's event subscriptions once the DOM is ready. Every
//! handler is a named function receiving the shared [`PageNav`]; closures
//! only forward to them.

pub mod dom;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::chapter_links::{ChapterLinks, REWRITTEN_ATTRIBUTE};
use crate::config::NavConfig;
use crate::header_tree::NodeId;
use crate::navigation::NavigationState;
use crate::render::{
    DEBUG_DATA_ID, DEBUG_DATA_STYLE, DEBUG_LINE_ID, NODE_ATTRIBUTE, debug_line_style,
    render_debug_table, render_on_this_page,
};
use crate::sidebar_scroll::{ActiveEntry, SidebarRestore, SidebarScrollMemory};
use dom::{DomLayout, SessionStorage, global_string, scan_headings};

const SIDEBAR_SELECTOR: &str =
    "mdbook-sidebar-scrollbox, #mdbook-sidebar-scrollbox, #mdbook-sidebar .sidebar-scrollbox";
const ACTIVE_SELECTOR: &str = "#mdbook-sidebar .active";

type Shared = Rc<RefCell<PageNav>>;

struct PageNav {
    window: Window,
    document: Document,
    state: NavigationState,
    layout: DomLayout,
    /// Sidebar `<li>` and `<a>` per tree node, empty for containers
    entries: Vec<Option<(Element, Element)>>,
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    #[cfg(feature = "console-logging")]
    {
        console_log::init_with_level(log::Level::Debug).ok();
    }

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    if document.ready_state() == "loading" {
        let target = document.clone();
        let closure = Closure::once_into_js(move || on_dom_ready(window, document));
        let _ = target.add_event_listener_with_callback("DOMContentLoaded", closure.unchecked_ref());
    } else {
        on_dom_ready(window, document);
    }
}

fn on_dom_ready(window: Window, document: Document) {
    let sidebar = document.query_selector(SIDEBAR_SELECTOR).ok().flatten();
    let mut storage = SessionStorage::new(&window);
    let config = NavConfig::default();

    if let Some(sidebar) = &sidebar {
        activate_chapter_links(&window, sidebar);
        subscribe_sidebar_clicks(&window, sidebar, config.clone());
    }

    let (elements, headings) = scan_headings(&document);
    let layout = DomLayout::new(window.clone(), document.clone(), elements);
    let mut state = NavigationState::new(config);

    let active = document.query_selector(ACTIVE_SELECTOR).ok().flatten();
    let mut entries = Vec::new();
    match &active {
        Some(active) if !headings.is_empty() => {
            state.install_headings(headings);
            if let Some(mount) = mount_on_this_page(&document, active, &state) {
                entries = collect_entries(&mount, &state);
                subscribe_header_clicks(&mount);
            }
        }
        _ => log::debug!("No active chapter entry or headings; header tracking disabled"),
    }

    if let Some(sidebar) = &sidebar {
        restore_sidebar_offset(state.sidebar_memory(), &mut storage, sidebar, active.as_ref());
    }

    let nav = Rc::new(RefCell::new(PageNav {
        window,
        document,
        state,
        layout,
        entries,
    }));
    PAGE.with(|page| *page.borrow_mut() = Some(nav.clone()));

    subscribe_scroll(&nav);
    expose_debug_hook(&nav);
    reload_current_header(&nav);
}

thread_local! {
    static PAGE: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

fn with_page(f: impl FnOnce(&Shared)) {
    PAGE.with(|page| {
        if let Some(nav) = page.borrow().as_ref() {
            f(nav);
        }
    });
}

fn mount_on_this_page(document: &Document, active: &Element, state: &NavigationState) -> Option<Element> {
    let tree = state.tree()?;
    let holder = document.create_element("div").ok()?;
    holder.set_inner_html(&render_on_this_page(tree));
    let mount = holder.first_element_child()?;
    let wrapper = active.parent_element()?;
    wrapper.after_with_node_1(&mount).ok()?;
    Some(mount)
}

fn collect_entries(mount: &Element, state: &NavigationState) -> Vec<Option<(Element, Element)>> {
    let Some(tree) = state.tree() else {
        return Vec::new();
    };
    (0..tree.len())
        .map(|id| {
            let item = mount
                .query_selector(&format!("li[{NODE_ATTRIBUTE}=\"{id}\"]"))
                .ok()
                .flatten()?;
            let link = item.query_selector("a.header-in-summary").ok().flatten()?;
            Some((item, link))
        })
        .collect()
}

/// Projects the tree's state onto the sidebar classes
fn sync_classes(nav: &PageNav) {
    let Some(tree) = nav.state.tree() else {
        return;
    };
    for (id, entry) in nav.entries.iter().enumerate() {
        let (Some((item, link)), Some(visual)) = (entry, tree.visual(id)) else {
            continue;
        };
        item.set_class_name(visual.item_class());
        link.set_class_name(visual.link_class());
    }
}

fn reload_current_header(nav: &Shared) {
    let mut page = nav.borrow_mut();
    let page = &mut *page;
    page.state.on_scroll(&page.layout);
    sync_classes(page);
    if page.state.threshold_debug().is_some() {
        draw_debug_overlay(page);
    }
}

fn on_header_click(nav: &Shared, target_id: &str) {
    let timer = nav.borrow_mut().state.on_header_click(target_id);
    let window = nav.borrow().window.clone();
    let forward = nav.clone();
    let callback = Closure::once_into_js(move || on_suppression_timeout(&forward, timer.generation));
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        timer.delay.as_millis() as i32,
    );
}

fn on_suppression_timeout(nav: &Shared, generation: u64) {
    if !nav.borrow_mut().state.on_suppression_timeout(generation) {
        return;
    }
    // Two nested frames so the post-scroll layout is final before it is read.
    request_frame(nav, |nav| {
        on_animation_frame(nav);
        request_frame(nav, on_animation_frame);
    });
}

fn request_frame(nav: &Shared, handler: impl FnOnce(&Shared) + 'static) {
    let window = nav.borrow().window.clone();
    let forward = nav.clone();
    let callback = Closure::once_into_js(move || handler(&forward));
    let _ = window.request_animation_frame(callback.unchecked_ref());
}

fn on_animation_frame(nav: &Shared) {
    let mut page = nav.borrow_mut();
    let page = &mut *page;
    if page.state.on_animation_frame(&page.layout).is_some() {
        sync_classes(page);
    }
}

fn on_header_toggle(nav: &Shared, node: NodeId) {
    let mut page = nav.borrow_mut();
    if page.state.toggle(node) {
        sync_classes(&page);
    }
}

fn subscribe_scroll(nav: &Shared) {
    let page = nav.borrow();
    // `load` fires after images and fonts have moved the headings
    let targets: [(&EventTarget, &str); 3] = [
        (page.document.as_ref(), "scroll"),
        (page.window.as_ref(), "resize"),
        (page.window.as_ref(), "load"),
    ];
    for (target, event) in targets {
        let forward = nav.clone();
        let closure = Closure::wrap(
            Box::new(move |_event: Event| reload_current_header(&forward)) as Box<dyn FnMut(Event)>
        );
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn subscribe_header_clicks(mount: &Element) {
    let closure = Closure::wrap(Box::new(move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if let Some(toggle) = target.closest(".header-toggle").ok().flatten() {
            let node = toggle
                .closest("li.header-item")
                .ok()
                .flatten()
                .and_then(|item| item.get_attribute(NODE_ATTRIBUTE))
                .and_then(|value| value.parse::<NodeId>().ok());
            if let Some(node) = node {
                with_page(|nav| on_header_toggle(nav, node));
            }
            return;
        }
        // closest() because the link may wrap elements such as <code>
        let href = target
            .closest("a.header-in-summary")
            .ok()
            .flatten()
            .and_then(|link| link.get_attribute("href"));
        if let Some(id) = href.as_deref().and_then(|href| href.strip_prefix('#')) {
            with_page(|nav| on_header_click(nav, id));
        }
    }) as Box<dyn FnMut(Event)>);
    let _ = mount.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Offset memory and chapter fold toggles on the sidebar itself
fn subscribe_sidebar_clicks(window: &Window, sidebar: &Element, config: NavConfig) {
    let mut storage = SessionStorage::new(window);
    let memory = SidebarScrollMemory::new(config.scroll_offset_key);
    let sidebar_ref = sidebar.clone();
    let closure = Closure::wrap(Box::new(move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if let Some(toggle) = target.closest(".chapter-fold-toggle").ok().flatten() {
            if !toggle.class_list().contains("header-toggle") {
                if let Some(item) = toggle.parent_element().and_then(|p| p.parent_element()) {
                    let _ = item.class_list().toggle("expanded");
                }
                return;
            }
        }
        if target.tag_name().eq_ignore_ascii_case("a") {
            let link_top = target.get_bounding_client_rect().top();
            let sidebar_top = sidebar_ref.get_bounding_client_rect().top();
            memory.remember_click(&mut storage, link_top, sidebar_top);
        }
    }) as Box<dyn FnMut(Event)>);
    let _ = sidebar.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Rewrites root-relative chapter links and marks the current page active.
///
/// Skipped when the sidebar already has an active entry: whatever set it also
/// made the links page-relative. Rewritten links are tagged so a second run
/// leaves them alone.
pub fn activate_chapter_links(window: &Window, sidebar: &Element) {
    if sidebar.query_selector(".active").ok().flatten().is_some() {
        log::debug!("Sidebar already has an active chapter; links left as they are");
        return;
    }
    let Ok(location) = window.location().href() else {
        return;
    };
    let path_to_root = global_string(window, "path_to_root").unwrap_or_default();
    let Some(links) = ChapterLinks::new(&location, &path_to_root) else {
        return;
    };
    let Ok(anchors) = sidebar.query_selector_all("a") else {
        return;
    };

    for i in 0..anchors.length() {
        let Some(anchor) = anchors.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let Some(href) = anchor.get_attribute("href") else {
            continue;
        };
        let update = links.update(i as usize, &href, anchor.has_attribute(REWRITTEN_ATTRIBUTE));
        if let Some(rewritten) = &update.href {
            let _ = anchor.set_attribute("href", rewritten);
            let _ = anchor.set_attribute(REWRITTEN_ATTRIBUTE, "");
        }
        if !update.active {
            continue;
        }
        let _ = anchor.class_list().add_1("active");
        let mut parent = anchor.parent_element();
        while let Some(element) = parent {
            if element.tag_name().eq_ignore_ascii_case("li")
                && element.class_list().contains("chapter-item")
            {
                let _ = element.class_list().add_1("expanded");
            }
            parent = element.parent_element();
        }
    }
}

/// Puts the active entry back at the offset saved by the previous page
pub fn restore_sidebar_offset(
    memory: &SidebarScrollMemory,
    storage: &mut SessionStorage,
    sidebar: &Element,
    active: Option<&Element>,
) {
    let entry = active.map(|active| ActiveEntry {
        entry_top: active.get_bounding_client_rect().top(),
        sidebar_top: sidebar.get_bounding_client_rect().top(),
        scroll_top: sidebar.scroll_top() as f64,
    });
    match memory.restore(storage, entry) {
        Some(SidebarRestore::ScrollTo(scroll_top)) => {
            sidebar.set_scroll_top(scroll_top.round() as i32);
        }
        Some(SidebarRestore::CenterActive) => {
            if let Some(active) = active {
                let options = ScrollIntoViewOptions::new();
                options.set_block(ScrollLogicalPosition::Center);
                active.scroll_into_view_with_scroll_into_view_options(&options);
            }
        }
        None => {}
    }
}

fn expose_debug_hook(nav: &Shared) {
    let forward = nav.clone();
    let closure = Closure::wrap(Box::new(move || {
        let mut page = forward.borrow_mut();
        let page = &mut *page;
        page.state.enable_threshold_debug(&page.layout);
        draw_debug_overlay(page);
    }) as Box<dyn FnMut()>);
    let window = nav.borrow().window.clone();
    let _ = js_sys::Reflect::set(&window, &"mdbookEnableThresholdDebug".into(), closure.as_ref());
    closure.forget();
}

fn draw_debug_overlay(page: &PageNav) {
    let Some(body) = page.document.body() else {
        return;
    };
    if let Some(debug) = page.state.threshold_debug() {
        let data = match page.document.get_element_by_id(DEBUG_DATA_ID) {
            Some(data) => Some(data),
            None => page.document.create_element("div").ok().inspect(|data| {
                data.set_id(DEBUG_DATA_ID);
                let _ = data.set_attribute("style", DEBUG_DATA_STYLE);
                let _ = body.append_child(data);
            }),
        };
        if let Some(data) = data {
            data.set_inner_html(&render_debug_table(debug));
        }
    }

    if let Some(existing) = page.document.get_element_by_id(DEBUG_LINE_ID) {
        existing.remove();
    }
    if let Ok(line) = page.document.create_element("div") {
        line.set_id(DEBUG_LINE_ID);
        let _ = line.set_attribute("style", &debug_line_style(page.state.threshold()));
        let _ = body.append_child(&line);
    }
}
