use sharpneedle_shared::{
    DEFAULT_RUNTIME_VERSION, Error, FailureClass, InvocationRequest, MetaHost, Result, RuntimeHost,
    RuntimeInfo, bootstrap, invoke, start_runtime,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// Raw HRESULTs the fake hosting API reports
const E_FILE_NOT_FOUND: i32 = 0x8007_0002_u32 as i32;
const CLR_E_SHIM_RUNTIMELOAD: i32 = 0x8013_1700_u32 as i32;
const E_NOINTERFACE: i32 = 0x8000_4002_u32 as i32;
const HOST_E_CLRNOTAVAILABLE: i32 = 0x8013_1023_u32 as i32;

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Acquired(&'static str),
    Released(&'static str),
    Started,
    Invoked(InvocationRequest),
}

/// What the fake hosting API reports at each step.
struct Scenario {
    meta_host_available: bool,
    installed: Vec<&'static str>,
    loadable: bool,
    host_available: bool,
    start_fails: bool,
    exit_code: u32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            meta_host_available: true,
            installed: vec![DEFAULT_RUNTIME_VERSION],
            loadable: true,
            host_available: true,
            start_fails: false,
            exit_code: 0,
        }
    }
}

/// Shared record of everything the mocks did.
#[derive(Default)]
struct Ledger {
    events: RefCell<Vec<Event>>,
}

impl Ledger {
    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| f(e)).count()
    }

    fn acquired(&self) -> usize {
        self.count(|e| matches!(e, Event::Acquired(_)))
    }

    fn released(&self) -> usize {
        self.count(|e| matches!(e, Event::Released(_)))
    }

    fn invocations(&self) -> usize {
        self.count(|e| matches!(e, Event::Invoked(_)))
    }
}

struct Fake {
    ledger: Rc<Ledger>,
    scenario: Rc<Scenario>,
}

impl Fake {
    fn new(scenario: Scenario) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            ledger: Rc::new(Ledger::default()),
            scenario: Rc::new(scenario),
        }
    }

    fn create(&self) -> impl FnOnce() -> Result<MockMetaHost> + use<> {
        let ledger = Rc::clone(&self.ledger);
        let scenario = Rc::clone(&self.scenario);
        move || {
            if !scenario.meta_host_available {
                return Err(Error::MetaHostUnavailable {
                    context: "CLRCreateInstance",
                    hresult: E_FILE_NOT_FOUND,
                });
            }
            ledger.push(Event::Acquired("meta_host"));
            Ok(MockMetaHost { ledger, scenario })
        }
    }
}

struct MockMetaHost {
    ledger: Rc<Ledger>,
    scenario: Rc<Scenario>,
}

impl MetaHost for MockMetaHost {
    type Info = MockRuntimeInfo;

    fn runtime(&self, version: &str) -> Result<MockRuntimeInfo> {
        if !self.scenario.installed.contains(&version) {
            return Err(Error::RuntimeNotInstalled {
                version: version.to_owned(),
                hresult: CLR_E_SHIM_RUNTIMELOAD,
            });
        }
        self.ledger.push(Event::Acquired("runtime_info"));
        Ok(MockRuntimeInfo {
            ledger: Rc::clone(&self.ledger),
            scenario: Rc::clone(&self.scenario),
        })
    }
}

impl Drop for MockMetaHost {
    fn drop(&mut self) {
        self.ledger.push(Event::Released("meta_host"));
    }
}

struct MockRuntimeInfo {
    ledger: Rc<Ledger>,
    scenario: Rc<Scenario>,
}

impl RuntimeInfo for MockRuntimeInfo {
    type Host = MockRuntimeHost;

    fn is_loadable(&self) -> Result<bool> {
        Ok(self.scenario.loadable)
    }

    fn runtime_host(&self) -> Result<MockRuntimeHost> {
        if !self.scenario.host_available {
            return Err(Error::RuntimeHostUnavailable {
                hresult: E_NOINTERFACE,
            });
        }
        self.ledger.push(Event::Acquired("runtime_host"));
        Ok(MockRuntimeHost {
            ledger: Rc::clone(&self.ledger),
            scenario: Rc::clone(&self.scenario),
            running: Cell::new(false),
        })
    }
}

impl Drop for MockRuntimeInfo {
    fn drop(&mut self) {
        self.ledger.push(Event::Released("runtime_info"));
    }
}

struct MockRuntimeHost {
    ledger: Rc<Ledger>,
    scenario: Rc<Scenario>,
    running: Cell<bool>,
}

impl RuntimeHost for MockRuntimeHost {
    fn start(&self) -> Result<()> {
        self.ledger.push(Event::Started);
        if self.scenario.start_fails {
            return Err(Error::StartFailed {
                hresult: HOST_E_CLRNOTAVAILABLE,
            });
        }
        self.running.set(true);
        Ok(())
    }

    fn execute_in_default_app_domain(&self, request: &InvocationRequest) -> Result<u32> {
        self.ledger.push(Event::Invoked(request.clone()));
        if !self.running.get() {
            return Err(Error::InvocationFailed {
                hresult: HOST_E_CLRNOTAVAILABLE,
            });
        }
        Ok(self.scenario.exit_code)
    }
}

impl Drop for MockRuntimeHost {
    fn drop(&mut self) {
        self.ledger.push(Event::Released("runtime_host"));
    }
}

#[test]
fn test_bootstrap_runs_requested_method() {
    let fake = Fake::new(Scenario {
        exit_code: 7,
        ..Scenario::default()
    });

    let code = bootstrap(
        &wide(r"C:\payload.dll*MyNamespace.MyType*Run*hello-world"),
        DEFAULT_RUNTIME_VERSION,
        fake.create(),
    )
    .expect("bootstrap should succeed");

    assert_eq!(code, 7);
    assert_eq!(
        fake.ledger.events(),
        vec![
            Event::Acquired("meta_host"),
            Event::Acquired("runtime_info"),
            Event::Acquired("runtime_host"),
            Event::Started,
            Event::Released("runtime_info"),
            Event::Released("meta_host"),
            Event::Invoked(InvocationRequest {
                assembly_path: wide(r"C:\payload.dll"),
                type_name: wide("MyNamespace.MyType"),
                method_name: wide("Run"),
                payload: wide("hello-world"),
            }),
            Event::Released("runtime_host"),
        ]
    );
}

#[test]
fn test_too_few_fields_never_reaches_runtime() {
    for input in ["", "a", "a*b", "a*b*c", r"C:\payload.dll*Type*Run"] {
        let fake = Fake::new(Scenario::default());

        let err = bootstrap(&wide(input), DEFAULT_RUNTIME_VERSION, fake.create()).unwrap_err();

        assert_eq!(err.class(), FailureClass::MalformedInput, "{input:?}");
        assert!(fake.ledger.events().is_empty(), "{input:?} touched the runtime");
    }
}

#[test]
fn test_extra_fields_are_not_forwarded() {
    let fake = Fake::new(Scenario::default());

    bootstrap(&wide("a*b*c*d*e*f"), DEFAULT_RUNTIME_VERSION, fake.create()).unwrap();

    let invoked: Vec<_> = fake
        .ledger
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Invoked(req) => Some(req),
            _ => None,
        })
        .collect();
    assert_eq!(invoked.len(), 1);
    assert_eq!(invoked[0].payload, wide("d"));
}

#[test]
fn test_not_loadable_releases_everything() {
    let fake = Fake::new(Scenario {
        loadable: false,
        ..Scenario::default()
    });

    let result = start_runtime(fake.create(), DEFAULT_RUNTIME_VERSION);

    assert!(matches!(result, Err(Error::RuntimeNotLoadable { .. })));
    assert_eq!(fake.ledger.acquired(), 2);
    assert_eq!(fake.ledger.released(), fake.ledger.acquired());
    assert_eq!(
        fake.ledger.events(),
        vec![
            Event::Acquired("meta_host"),
            Event::Acquired("runtime_info"),
            Event::Released("runtime_info"),
            Event::Released("meta_host"),
        ]
    );
}

#[test]
fn test_not_loadable_never_invokes() {
    let fake = Fake::new(Scenario {
        loadable: false,
        ..Scenario::default()
    });

    let err = bootstrap(&wide("a*b*c*d"), DEFAULT_RUNTIME_VERSION, fake.create()).unwrap_err();

    assert_eq!(err.class(), FailureClass::RuntimeAcquisition);
    assert_eq!(fake.ledger.invocations(), 0);
}

#[test]
fn test_meta_host_unavailable() {
    let fake = Fake::new(Scenario {
        meta_host_available: false,
        ..Scenario::default()
    });

    let result = start_runtime(fake.create(), DEFAULT_RUNTIME_VERSION);

    assert!(matches!(
        result,
        Err(Error::MetaHostUnavailable {
            hresult: E_FILE_NOT_FOUND,
            ..
        })
    ));
    assert!(fake.ledger.events().is_empty());
}

#[test]
fn test_version_not_installed_releases_meta_host() {
    let fake = Fake::new(Scenario {
        installed: vec!["v2.0.50727"],
        ..Scenario::default()
    });

    let result = start_runtime(fake.create(), DEFAULT_RUNTIME_VERSION);

    match result {
        Err(Error::RuntimeNotInstalled { version, hresult }) => {
            assert_eq!(version, DEFAULT_RUNTIME_VERSION);
            assert_eq!(hresult, CLR_E_SHIM_RUNTIMELOAD);
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("runtime should not have been found"),
    }
    assert_eq!(
        fake.ledger.events(),
        vec![Event::Acquired("meta_host"), Event::Released("meta_host")]
    );
}

#[test]
fn test_host_unavailable_releases_in_reverse_order() {
    let fake = Fake::new(Scenario {
        host_available: false,
        ..Scenario::default()
    });

    let result = start_runtime(fake.create(), DEFAULT_RUNTIME_VERSION);

    assert!(matches!(
        result,
        Err(Error::RuntimeHostUnavailable {
            hresult: E_NOINTERFACE
        })
    ));
    assert_eq!(
        fake.ledger.events(),
        vec![
            Event::Acquired("meta_host"),
            Event::Acquired("runtime_info"),
            Event::Released("runtime_info"),
            Event::Released("meta_host"),
        ]
    );
}

#[test]
fn test_only_host_survives_acquisition() {
    let fake = Fake::new(Scenario::default());

    let host = start_runtime(fake.create(), DEFAULT_RUNTIME_VERSION).unwrap();
    assert_eq!(fake.ledger.acquired(), 3);
    assert_eq!(fake.ledger.released(), 2);

    drop(host);
    assert_eq!(fake.ledger.released(), 3);
}

#[test]
fn test_start_is_idempotent() {
    let fake = Fake::new(Scenario {
        exit_code: 42,
        ..Scenario::default()
    });
    let request = InvocationRequest::parse("a*b*c*d").unwrap();

    let host = start_runtime(fake.create(), DEFAULT_RUNTIME_VERSION).unwrap();
    let first = invoke(&host, &request).unwrap();

    host.start().unwrap();
    host.start().unwrap();
    let second = invoke(&host, &request).unwrap();

    assert_eq!(first, second);
    assert_eq!(fake.ledger.count(|e| *e == Event::Started), 3);
}

#[test]
fn test_failed_start_still_returns_host() {
    let fake = Fake::new(Scenario {
        start_fails: true,
        ..Scenario::default()
    });

    let err = bootstrap(&wide("a*b*c*d"), DEFAULT_RUNTIME_VERSION, fake.create()).unwrap_err();

    // The host was handed over and the call attempted; execution reports the failure.
    assert!(matches!(
        err,
        Error::InvocationFailed {
            hresult: HOST_E_CLRNOTAVAILABLE
        }
    ));
    assert_eq!(err.class(), FailureClass::Invocation);
    assert_eq!(fake.ledger.invocations(), 1);
    assert_eq!(fake.ledger.released(), fake.ledger.acquired());
}

#[test]
fn test_unpaired_surrogate_payload_is_forwarded() {
    let fake = Fake::new(Scenario::default());
    let mut input = wide(r"C:\payload.dll*MyNamespace.MyType*Run*x");
    input.push(0xD800);

    bootstrap(&input, DEFAULT_RUNTIME_VERSION, fake.create()).unwrap();

    let expected = InvocationRequest {
        assembly_path: wide(r"C:\payload.dll"),
        type_name: wide("MyNamespace.MyType"),
        method_name: wide("Run"),
        payload: vec![0x78, 0xD800],
    };
    assert!(fake.ledger.events().contains(&Event::Invoked(expected)));
}
