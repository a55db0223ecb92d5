//! Java generic-service generation.
//!
//! Mirrors the C++ service surface: an abstract base class whose
//! `callMethod` dispatches on the method's declaration index, an async stub
//! over `RpcChannel`, and a blocking stub over `BlockingRpcChannel`.

use crate::descriptor::{MethodDescriptor, ServiceDescriptor};
use crate::error::Result;
use crate::printer::Printer;

use super::names;

pub struct ServiceGenerator<'a> {
    service: ServiceDescriptor<'a>,
    classname: String,
}

impl<'a> ServiceGenerator<'a> {
    pub fn new(service: ServiceDescriptor<'a>) -> ServiceGenerator<'a> {
        ServiceGenerator {
            service,
            classname: names::service_class_name(service),
        }
    }

    fn method_vars(&self, method: MethodDescriptor<'_>) -> Result<Vec<(String, String)>> {
        Ok(vec![
            (
                "method".to_string(),
                names::underscores_to_camel_case(method.name(), false),
            ),
            ("index".to_string(), method.index().to_string()),
            (
                "input".to_string(),
                names::qualified_class_name(method.input_type())?,
            ),
            (
                "output".to_string(),
                names::qualified_class_name(method.output_type())?,
            ),
        ])
    }

    pub fn generate(&self, printer: &mut Printer) -> Result<()> {
        let index = self.service.index().to_string();
        let package = names::java_package(self.service.file());
        let outer = names::file_class_name(self.service.file())?;
        let qualified_outer = if package.is_empty() {
            outer
        } else {
            format!("{package}.{outer}")
        };
        let method_vars: Vec<Vec<(String, String)>> = self
            .service
            .methods()
            .map(|m| self.method_vars(m))
            .collect::<Result<_>>()?;

        printer.with_vars(
            &[
                ("classname", &self.classname),
                ("service_index", &index),
                ("outer", &qualified_outer),
            ],
            |p| {
                p.print(
                    "public abstract static class $classname$\n\
                     \x20   implements com.google.protobuf.Service {\n",
                );
                p.indent();
                p.print("protected $classname$() {}\n\n");

                for vars in &method_vars {
                    with_method(p, vars, |p| {
                        p.print(
                            "public abstract void $method$(\n\
                             \x20   com.google.protobuf.RpcController controller,\n\
                             \x20   $input$ request,\n\
                             \x20   com.google.protobuf.RpcCallback<$output$> done);\n\n",
                        );
                    });
                }

                p.print(
                    "public static final com.google.protobuf.Descriptors.ServiceDescriptor\n\
                     \x20   getDescriptor() {\n\
                     \x20 return $outer$.getDescriptor().getServices().get($service_index$);\n\
                     }\n\
                     public final com.google.protobuf.Descriptors.ServiceDescriptor\n\
                     \x20   getDescriptorForType() {\n\
                     \x20 return getDescriptor();\n\
                     }\n\n",
                );

                p.print(
                    "public final void callMethod(\n\
                     \x20   com.google.protobuf.Descriptors.MethodDescriptor method,\n\
                     \x20   com.google.protobuf.RpcController controller,\n\
                     \x20   com.google.protobuf.Message request,\n\
                     \x20   com.google.protobuf.RpcCallback<com.google.protobuf.Message> done) {\n\
                     \x20 if (method.getService() != getDescriptor()) {\n\
                     \x20   throw new java.lang.IllegalArgumentException(\n\
                     \x20       \"Service.callMethod() given method descriptor for wrong service type.\");\n\
                     \x20 }\n\
                     \x20 switch (method.getIndex()) {\n",
                );
                for vars in &method_vars {
                    with_method(p, vars, |p| {
                        p.print(
                            "\x20   case $index$:\n\
                             \x20     this.$method$(controller, ($input$) request,\n\
                             \x20         com.google.protobuf.RpcUtil.<$output$>specializeCallback(done));\n\
                             \x20     return;\n",
                        );
                    });
                }
                p.print(
                    "\x20   default:\n\
                     \x20     throw new java.lang.AssertionError(\"Can't get here.\");\n\
                     \x20 }\n\
                     }\n\n",
                );

                self.generate_prototype_getter(p, &method_vars, "getRequestPrototype", "input");
                self.generate_prototype_getter(p, &method_vars, "getResponsePrototype", "output");

                // Async stub.
                p.print(
                    "public static Stub newStub(com.google.protobuf.RpcChannel channel) {\n\
                     \x20 return new Stub(channel);\n\
                     }\n\n\
                     public static final class Stub extends $classname$ {\n\
                     \x20 private Stub(com.google.protobuf.RpcChannel channel) {\n\
                     \x20   this.channel = channel;\n\
                     \x20 }\n\n\
                     \x20 private final com.google.protobuf.RpcChannel channel;\n\n\
                     \x20 public com.google.protobuf.RpcChannel getChannel() {\n\
                     \x20   return channel;\n\
                     \x20 }\n\n",
                );
                for vars in &method_vars {
                    with_method(p, vars, |p| {
                        p.print(
                            "\x20 public void $method$(\n\
                             \x20     com.google.protobuf.RpcController controller,\n\
                             \x20     $input$ request,\n\
                             \x20     com.google.protobuf.RpcCallback<$output$> done) {\n\
                             \x20   channel.callMethod(\n\
                             \x20       getDescriptor().getMethods().get($index$),\n\
                             \x20       controller,\n\
                             \x20       request,\n\
                             \x20       $output$.getDefaultInstance(),\n\
                             \x20       com.google.protobuf.RpcUtil.generalizeCallback(\n\
                             \x20           done,\n\
                             \x20           $output$.class,\n\
                             \x20           $output$.getDefaultInstance()));\n\
                             \x20 }\n\n",
                        );
                    });
                }
                p.print("}\n\n");

                // Blocking stub.
                p.print(
                    "public static BlockingInterface newBlockingStub(\n\
                     \x20   com.google.protobuf.BlockingRpcChannel channel) {\n\
                     \x20 return new BlockingStub(channel);\n\
                     }\n\n\
                     public interface BlockingInterface {\n",
                );
                for vars in &method_vars {
                    with_method(p, vars, |p| {
                        p.print(
                            "\x20 $output$ $method$(\n\
                             \x20     com.google.protobuf.RpcController controller,\n\
                             \x20     $input$ request)\n\
                             \x20     throws com.google.protobuf.ServiceException;\n",
                        );
                    });
                }
                p.print(
                    "}\n\n\
                     private static final class BlockingStub implements BlockingInterface {\n\
                     \x20 private BlockingStub(com.google.protobuf.BlockingRpcChannel channel) {\n\
                     \x20   this.channel = channel;\n\
                     \x20 }\n\n\
                     \x20 private final com.google.protobuf.BlockingRpcChannel channel;\n\n",
                );
                for vars in &method_vars {
                    with_method(p, vars, |p| {
                        p.print(
                            "\x20 public $output$ $method$(\n\
                             \x20     com.google.protobuf.RpcController controller,\n\
                             \x20     $input$ request)\n\
                             \x20     throws com.google.protobuf.ServiceException {\n\
                             \x20   return ($output$) channel.callBlockingMethod(\n\
                             \x20       getDescriptor().getMethods().get($index$),\n\
                             \x20       controller,\n\
                             \x20       request,\n\
                             \x20       $output$.getDefaultInstance());\n\
                             \x20 }\n\n",
                        );
                    });
                }
                p.print("}\n");
                p.outdent();
                p.print("}\n");
            },
        );
        Ok(())
    }

    fn generate_prototype_getter(
        &self,
        p: &mut Printer,
        method_vars: &[Vec<(String, String)>],
        getter: &str,
        prototype_key: &str,
    ) {
        p.with_vars(&[("getter", getter)], |p| {
            p.print(
                "public final com.google.protobuf.Message $getter$(\n\
                 \x20   com.google.protobuf.Descriptors.MethodDescriptor method) {\n\
                 \x20 if (method.getService() != getDescriptor()) {\n\
                 \x20   throw new java.lang.IllegalArgumentException(\n\
                 \x20       \"$getter$() given method descriptor for wrong service type.\");\n\
                 \x20 }\n\
                 \x20 switch (method.getIndex()) {\n",
            );
            for vars in method_vars {
                let lookup = |key: &str| {
                    vars.iter()
                        .find(|(k, _)| k == key)
                        .map(|(_, v)| v.as_str())
                        .expect("method var")
                };
                p.print_with(
                    &[
                        ("index", lookup("index")),
                        ("prototype", lookup(prototype_key)),
                    ],
                    "\x20   case $index$:\n\
                     \x20     return $prototype$.getDefaultInstance();\n",
                );
            }
            p.print(
                "\x20   default:\n\
                 \x20     throw new java.lang.AssertionError(\"Can't get here.\");\n\
                 \x20 }\n\
                 }\n\n",
            );
        });
    }
}

fn with_method<F>(p: &mut Printer, vars: &[(String, String)], body: F)
where
    F: FnOnce(&mut Printer),
{
    let view: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    p.with_vars(&view, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::printer::Printer;
    use crate::proto::*;

    fn pool_with_service() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "search.proto".to_string(),
            package: "demo".to_string(),
            syntax: "proto2".to_string(),
            message_type: vec![
                DescriptorProto {
                    name: "Query".to_string(),
                    ..Default::default()
                },
                DescriptorProto {
                    name: "Hits".to_string(),
                    ..Default::default()
                },
            ],
            service: vec![ServiceDescriptorProto {
                name: "Index".to_string(),
                method: vec![
                    MethodDescriptorProto {
                        name: "lookup".to_string(),
                        input_type: ".demo.Query".to_string(),
                        output_type: ".demo.Hits".to_string(),
                        ..Default::default()
                    },
                    MethodDescriptorProto {
                        name: "refresh".to_string(),
                        input_type: ".demo.Query".to_string(),
                        output_type: ".demo.Hits".to_string(),
                        ..Default::default()
                    },
                ],
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        pool
    }

    fn render() -> String {
        let pool = pool_with_service();
        let file = pool.file_by_name("search.proto").unwrap();
        let service = file.services().next().unwrap();
        let mut printer = Printer::new();
        ServiceGenerator::new(service).generate(&mut printer).unwrap();
        printer.into_parts().0
    }

    #[test]
    fn dispatch_is_keyed_on_method_index() {
        let out = render();
        assert!(out.contains("switch (method.getIndex())"));
        assert!(out.contains("case 1:"));
        assert!(out.contains("this.refresh(controller, (demo.Search.Query) request,"));
    }

    #[test]
    fn both_stub_flavors_are_emitted() {
        let out = render();
        assert!(out.contains("public static final class Stub extends Index"));
        assert!(out.contains("interface BlockingInterface"));
        assert!(out.contains("channel.callBlockingMethod("));
        assert!(out.contains("getDescriptor().getMethods().get(0)"));
    }
}
