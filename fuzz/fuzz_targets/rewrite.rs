#![no_main]

//! Fuzz target for the detect/rewrite cycle.
//!
//! Builds a container from structured input, then applies every policy's violation once.
//! A rewrite either refuses or yields a container whose marker balance is unchanged and whose doc
//! comments are the same multiset as before.

use libfuzzer_sys::fuzz_target;
use orderfix_decor::DecorationIndex;
use orderfix_domain::{PolicyRegistry, detect};
use orderfix_edit::{RewriteOptions, SoleMemberRegions, try_rewrite};
use orderfix_types::container::{BaseType, Container, ContainerKind};
use orderfix_types::decor::Decoration;
use orderfix_types::model::{Accessibility, DeclKind, Declaration, Location, Param};

const NAMES: &[&str] = &["Foo", "Dispose", "Equals", "GetHashCode", "Run", "Widget"];
const ATTRIBUTES: &[&str] = &["SetUp", "TearDown", "OneTimeSetUp", "OneTimeTearDown", "Test"];

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    members: Vec<MemberInput>,
    interfaces: Vec<u8>,
    drop_sole_regions: bool,
}

#[derive(Debug, arbitrary::Arbitrary)]
struct MemberInput {
    kind: u8,
    name: u8,
    arity: u8,
    is_static: bool,
    private: bool,
    attribute: Option<u8>,
    leading: u8,
    trailing: u8,
    open: bool,
    close: bool,
}

fn declaration(m: &MemberInput, index: usize) -> Declaration {
    let params: Vec<Param> = (0..m.arity % 3)
        .map(|i| Param {
            name: format!("p{i}"),
            type_name: if i % 2 == 0 { "int" } else { "string" }.to_string(),
            variadic: false,
        })
        .collect();
    let kind = match m.kind % 5 {
        0 | 1 => DeclKind::Method { params },
        2 => DeclKind::Constructor { params },
        3 => DeclKind::Operator {
            token: "==".into(),
            params,
        },
        _ => DeclKind::Field {
            type_name: "int".into(),
            is_const: m.arity % 3 == 0,
            is_readonly: m.arity % 3 == 1,
        },
    };
    let name = NAMES[m.name as usize % NAMES.len()];
    let mut decl = Declaration::new(name, kind)
        .with_accessibility(if m.private {
            Accessibility::Private
        } else {
            Accessibility::Public
        })
        .with_static(m.is_static)
        .with_location("Widget.cs", index as u32 + 1);
    if let Some(a) = m.attribute {
        decl = decl.with_attribute(ATTRIBUTES[a as usize % ATTRIBUTES.len()]);
    }
    decl
}

fn docs(c: &Container) -> Vec<String> {
    let mut docs: Vec<String> = c
        .siblings()
        .iter()
        .filter_map(|s| s.decor.doc_comment.clone())
        .collect();
    docs.sort();
    docs
}

fn marker_balance(c: &Container) -> (isize, usize) {
    let index = DecorationIndex::build(c);
    let (opens, closes) = index.marker_counts();
    (opens as isize - closes as isize, index.unbalanced().len())
}

fuzz_target!(|input: FuzzInput| {
    if input.members.len() > 24 {
        return;
    }

    let mut c = Container::new("Widget", ContainerKind::Class, Location::default());
    for i in input.interfaces.iter().take(4) {
        let name = ["IWidget", "IDisposable", "IComparable<Widget>", "IFoo"][*i as usize % 4];
        c.base_list.push(BaseType::interface(name));
    }
    for (i, m) in input.members.iter().enumerate() {
        let mut decor = Decoration::default()
            .with_doc(format!("/// member {i}"))
            .with_blank_lines(u32::from(m.leading % 3), u32::from(m.trailing % 3));
        if m.open {
            decor = decor.open(format!("R{i}"));
        }
        if m.close {
            decor = decor.close();
        }
        c.push(declaration(m, i), decor);
    }

    let options = RewriteOptions {
        sole_member_regions: if input.drop_sole_regions {
            SoleMemberRegions::Drop
        } else {
            SoleMemberRegions::Travel
        },
    };
    let balance = marker_balance(&c);

    for policy in PolicyRegistry::default().iter() {
        let Some(violation) = detect(&c, policy) else {
            continue;
        };
        let Ok(next) = try_rewrite(&c, &violation, &options) else {
            continue;
        };

        assert_eq!(next.len(), c.len());
        assert_eq!(docs(&next), docs(&c));

        assert_eq!(marker_balance(&next), balance);
    }
});
