use component_macros::Component;
use di_abstractions::{Autowired, ComponentType};
use infrastructure_common::{Invocable, InvocationError, OperationSignature, Value};

#[derive(Default, Component)]
struct Journal;

#[derive(Default, Component)]
#[component(name = "greeter", invocable, init = "start", destroy = "stop")]
struct GreeterImpl {
    #[autowired]
    journal: Autowired<Journal>,
    #[autowired(name = "fallback", required = false)]
    fallback: Autowired<dyn Invocable>,
}

impl GreeterImpl {
    fn start(&self) -> Result<(), std::io::Error> {
        Ok(())
    }

    fn stop(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Invocable for GreeterImpl {
    fn operations(&self) -> Vec<OperationSignature> {
        vec![OperationSignature::of::<Self>("greet")]
    }

    fn invoke(&self, operation: &str, _args: &[Value]) -> Result<Value, InvocationError> {
        Err(InvocationError::unknown_operation("GreeterImpl", operation))
    }
}

fn main() {
    let definition = GreeterImpl::definition();
    assert_eq!(definition.explicit_name(), Some("greeter"));
    assert_eq!(definition.dependencies().len(), 2);
    assert!(definition.has_init());
    assert!(definition.has_destroy());

    let journal = Journal::definition();
    assert!(journal.dependencies().is_empty());
}
