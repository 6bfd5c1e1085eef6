use js_sys::{Array, Promise};
use wasm_bindgen::{JsCast, closure::Closure, prelude::*};
use wasm_bindgen_futures::{JsFuture, future_to_promise};

pub const CACHE_NAME: &str = "basurayt-v1";
pub const PRECACHE_URLS: [&str; 11] = [
    "/",
    "/index.html",
    "/stylesheet.css",
    "/manifest.json",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
    "/basurayt.js",
    "/basurayt_bg.wasm",
    "/sw_bootstrap.js",
    "/assets/sw/basurayt_sw.js",
    "/assets/sw/basurayt_sw_bg.wasm",
];

pub fn stale_cache_names<I>(names: I, current: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names.into_iter().filter(|name| name != current).collect()
}

#[wasm_bindgen]
pub fn start() {
    install_precache_listener();
    install_activate_listener();
    install_fetch_listener();
}

fn service_worker_scope() -> Result<web_sys::ServiceWorkerGlobalScope, JsValue> {
    js_sys::global()
        .dyn_into::<web_sys::ServiceWorkerGlobalScope>()
        .map_err(JsValue::from)
}

fn log_error(context: &str, err: &JsValue) {
    web_sys::console::error_2(&JsValue::from_str(&format!("[BASURAYT sw] {context}")), err);
}

fn install_precache_listener() {
    let Ok(scope) = service_worker_scope() else {
        return;
    };

    let on_install = Closure::wrap(Box::new(move |event: web_sys::ExtendableEvent| {
        // A rejected promise fails the install, so nothing is half-cached.
        let promise = future_to_promise(async move {
            if let Err(err) = precache_assets().await {
                log_error("precache failed", &err);
                return Err(err);
            }
            Ok(JsValue::UNDEFINED)
        });
        if let Err(err) = event.wait_until(&promise) {
            log_error("install waitUntil", &err);
        }
    }) as Box<dyn FnMut(_)>);

    let _ = scope.add_event_listener_with_callback("install", on_install.as_ref().unchecked_ref());
    on_install.forget();
}

fn install_activate_listener() {
    let Ok(scope) = service_worker_scope() else {
        return;
    };

    let on_activate = Closure::wrap(Box::new(move |event: web_sys::ExtendableEvent| {
        let promise = future_to_promise(async move {
            if let Err(err) = purge_old_caches().await {
                log_error("cache purge failed", &err);
            }
            Ok(JsValue::UNDEFINED)
        });
        if let Err(err) = event.wait_until(&promise) {
            log_error("activate waitUntil", &err);
        }
    }) as Box<dyn FnMut(_)>);

    let _ = scope.add_event_listener_with_callback("activate", on_activate.as_ref().unchecked_ref());
    on_activate.forget();
}

fn install_fetch_listener() {
    let Ok(scope) = service_worker_scope() else {
        return;
    };

    let on_fetch = Closure::wrap(Box::new(move |event: web_sys::FetchEvent| {
        let request = event.request();
        let promise = future_to_promise(async move {
            let response = cache_first(&request).await?;
            Ok(response.into())
        });
        if let Err(err) = event.respond_with(&promise) {
            log_error("respondWith", &err);
        }
    }) as Box<dyn FnMut(_)>);

    let _ = scope.add_event_listener_with_callback("fetch", on_fetch.as_ref().unchecked_ref());
    on_fetch.forget();
}

async fn cache_first(request: &web_sys::Request) -> Result<web_sys::Response, JsValue> {
    if let Some(cached) = cache_match(request).await? {
        return Ok(cached);
    }

    let scope = service_worker_scope()?;
    let fetched = JsFuture::from(scope.fetch_with_request(request)).await?;
    fetched.dyn_into::<web_sys::Response>()
}

async fn cache_match(request: &web_sys::Request) -> Result<Option<web_sys::Response>, JsValue> {
    let scope = service_worker_scope()?;
    let cache_storage = scope.caches()?;
    let matched = JsFuture::from(cache_storage.match_with_request(request)).await?;

    if matched.is_undefined() || matched.is_null() {
        return Ok(None);
    }

    Ok(Some(matched.dyn_into::<web_sys::Response>()?))
}

async fn purge_old_caches() -> Result<(), JsValue> {
    let scope = service_worker_scope()?;
    purge_stale_caches(&scope.caches()?, CACHE_NAME).await
}

async fn purge_stale_caches(
    cache_storage: &web_sys::CacheStorage,
    current: &str,
) -> Result<(), JsValue> {
    let keys = JsFuture::from(cache_storage.keys()).await?;
    let names: Vec<String> = Array::from(&keys)
        .iter()
        .filter_map(|key| key.as_string())
        .collect();

    let deletions = Array::new();
    for name in stale_cache_names(names, current) {
        deletions.push(&cache_storage.delete(&name));
    }
    let _ = JsFuture::from(Promise::all(&deletions)).await?;
    Ok(())
}

async fn precache_assets() -> Result<(), JsValue> {
    let scope = service_worker_scope()?;
    precache_into(&scope.caches()?, CACHE_NAME, &PRECACHE_URLS).await
}

// addAll rejects on any failed or non-ok response and stores nothing.
async fn precache_into(
    cache_storage: &web_sys::CacheStorage,
    cache_name: &str,
    urls: &[&str],
) -> Result<(), JsValue> {
    let cache_value = JsFuture::from(cache_storage.open(cache_name)).await?;
    let cache = cache_value.dyn_into::<web_sys::Cache>()?;

    let urls: Array = urls.iter().map(|url| JsValue::from_str(url)).collect();
    let _ = JsFuture::from(cache.add_all_with_str_sequence(&urls)).await?;
    Ok(())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn window_caches() -> web_sys::CacheStorage {
        web_sys::window()
            .expect("no window")
            .caches()
            .expect("cache storage")
    }

    async fn has_cache(cache_storage: &web_sys::CacheStorage, name: &str) -> bool {
        JsFuture::from(cache_storage.has(name))
            .await
            .expect("caches.has")
            .as_bool()
            .unwrap_or(false)
    }

    async fn cached_count(cache_storage: &web_sys::CacheStorage, name: &str) -> u32 {
        let cache = JsFuture::from(cache_storage.open(name))
            .await
            .expect("open")
            .dyn_into::<web_sys::Cache>()
            .expect("cache");
        let keys = JsFuture::from(cache.keys()).await.expect("keys");
        Array::from(&keys).length()
    }

    #[wasm_bindgen_test]
    async fn precache_is_all_or_nothing() {
        let cache_storage = window_caches();
        let name = "basurayt-test-precache";
        let _ = JsFuture::from(cache_storage.delete(name)).await;

        let result = precache_into(
            &cache_storage,
            name,
            &["/", "/basurayt-missing-asset-404.txt"],
        )
        .await;
        assert!(result.is_err());
        assert_eq!(cached_count(&cache_storage, name).await, 0);

        let _ = JsFuture::from(cache_storage.delete(name)).await;
    }

    #[wasm_bindgen_test]
    async fn purge_keeps_only_current_generation() {
        let cache_storage = window_caches();
        for name in ["basurayt-test-v0", "basurayt-test-v1"] {
            JsFuture::from(cache_storage.open(name)).await.expect("open");
        }

        purge_stale_caches(&cache_storage, "basurayt-test-v1")
            .await
            .expect("purge");

        assert!(!has_cache(&cache_storage, "basurayt-test-v0").await);
        assert!(has_cache(&cache_storage, "basurayt-test-v1").await);
        let _ = JsFuture::from(cache_storage.delete("basurayt-test-v1")).await;
    }
}
