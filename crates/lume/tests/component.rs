//! Component mount lifecycle and in-tree discovery.

use lume::prelude::*;

struct Card {
    core: ComponentCore,
    title: &'static str,
    body: Obj,
}

impl Card {
    fn new(title: &'static str) -> Self {
        Self {
            core: ComponentCore::new(),
            title,
            body: Obj::null(),
        }
    }
}

impl Component for Card {
    fn core(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn core_ref(&self) -> &ComponentCore {
        &self.core
    }

    fn build(&mut self, parent: Obj) -> Obj {
        let root = Obj::create(parent).size(100, 60);
        Label::create(root).text(self.title);
        self.body = Obj::create(root);
        root
    }
}

#[test]
fn mount_builds_subtree_and_unmount_deletes_it() {
    lume::init();
    let mut card = Mounted::new(Card::new("hello"), app::screen());
    assert!(card.is_mounted());
    let root = card.root();
    assert!(root.is_valid());
    assert_eq!(root.child_count(), 2);

    card.unmount();
    assert!(!card.is_mounted());
    assert!(!root.is_valid());

    // Unmounting again is a no-op.
    card.unmount();
}

#[test]
fn discovery_from_root_and_descendants() {
    lume::init();
    let card = Mounted::new(Card::new("find me"), app::screen());
    let root = card.root();
    let body = card.body;

    let via_root = unsafe { Card::from_widget(root) }.expect("from root");
    let via_body = unsafe { Card::from_widget(body) }.expect("from descendant");
    assert_eq!(via_root, via_body);
    assert_eq!(unsafe { via_root.as_ref() }.title, "find me");
}

#[test]
fn descendants_keep_a_free_user_data_word() {
    lume::init();
    let card = Mounted::new(Card::new("payload"), app::screen());
    let marker = Box::leak(Box::new(7u64));

    // The body widget's user-data word belongs to the application.
    card.body.set_user_data((marker as *mut u64).cast());
    assert_eq!(card.body.user_data(), (marker as *mut u64).cast());

    // And discovery still works past it because it walks to the root.
    assert!(unsafe { Card::from_widget(card.body) }.is_some());
}

#[test]
fn hostile_user_data_is_rejected() {
    lume::init();
    let card = Mounted::new(Card::new("real"), app::screen());

    // Sibling widget with a crafted byte pattern in its user-data word.
    let decoy = Box::leak(Box::new([0xDEAD_BEEFu64; 6]));
    let sibling = Obj::create(app::screen()).set_user_data((decoy as *mut [u64; 6]).cast());

    assert!(unsafe { Card::from_widget(sibling) }.is_none());

    // Discovery from an event raised on the sibling also misses.
    thread_local! {
        static FOUND: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
    }
    FOUND.with(|f| f.set(false));
    sibling
        .on_clicked(|e| {
            let hit = unsafe { Card::from_event(&e) }.is_some();
            FOUND.with(|f| f.set(hit));
        })
        .send_event(EventCode::Clicked, std::ptr::null_mut());
    assert!(!FOUND.with(|f| f.get()));

    // While an event on the real component's subtree finds it.
    FOUND.with(|f| f.set(false));
    card.body
        .on_clicked(|e| {
            let hit = unsafe { Card::from_event(&e) }.is_some();
            FOUND.with(|f| f.set(hit));
        })
        .send_event(EventCode::Clicked, std::ptr::null_mut());
    assert!(FOUND.with(|f| f.get()));
}

#[test]
fn two_component_types_do_not_cross_match() {
    lume::init();

    struct Badge {
        core: ComponentCore,
    }
    impl Component for Badge {
        fn core(&mut self) -> &mut ComponentCore {
            &mut self.core
        }
        fn core_ref(&self) -> &ComponentCore {
            &self.core
        }
        fn build(&mut self, parent: Obj) -> Obj {
            Obj::create(parent)
        }
    }

    let card = Mounted::new(Card::new("a"), app::screen());
    let badge = Mounted::new(
        Badge {
            core: ComponentCore::new(),
        },
        app::screen(),
    );

    assert!(unsafe { Badge::from_widget(card.root()) }.is_none());
    assert!(unsafe { Card::from_widget(badge.root()) }.is_none());
    assert!(unsafe { Card::from_widget(card.root()) }.is_some());
}

#[test]
fn user_payload_rides_the_binding() {
    lume::init();
    let mut card = Mounted::new(Card::new("p"), app::screen());
    let extra = Box::leak(Box::new(41i32));
    card.set_user_payload((extra as *mut i32).cast());

    let found = unsafe { Card::from_widget(card.root()) }.unwrap();
    let payload = unsafe { found.as_ref() }.user_payload();
    assert_eq!(unsafe { *payload.cast::<i32>() }, 41);
}
